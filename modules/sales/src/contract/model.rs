/// One transaction as returned to callers. Fields absent from the source
/// document stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleRecord {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub customer_region: Option<String>,
    pub product_category: Option<String>,
    pub quantity: Option<i64>,
    pub total_amount: Option<f64>,
    pub product_id: Option<String>,
    pub employee_name: Option<String>,
    pub payment_method: Option<String>,
    pub tags: Option<String>,
}

/// Facet selections. Empty lists and `None` bounds do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub customer_regions: Vec<String>,
    pub genders: Vec<String>,
    pub product_categories: Vec<String>,
    pub tags: Vec<String>,
    pub payment_methods: Vec<String>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    /// Inclusive, compared lexically against the stored ISO date.
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Free-text search token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    pub token: String,
}

impl SearchSpec {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Sortable columns exposed to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Date,
    Quantity,
    CustomerName,
    CustomerId,
    TotalAmount,
    Age,
    Gender,
    ProductCategory,
    CustomerRegion,
    ProductId,
    EmployeeName,
}

impl SortKey {
    /// Resolve an API sort name; unknown names fall back to the identifier.
    pub fn parse(name: &str) -> Self {
        match name {
            "date" => Self::Date,
            "quantity" => Self::Quantity,
            "customerName" => Self::CustomerName,
            "customerId" => Self::CustomerId,
            "totalAmount" => Self::TotalAmount,
            "age" => Self::Age,
            "gender" => Self::Gender,
            "productCategory" => Self::ProductCategory,
            "customerRegion" => Self::CustomerRegion,
            "productId" => Self::ProductId,
            "employeeName" => Self::EmployeeName,
            _ => Self::Id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` in any case means ascending, anything else descending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }
}

/// Which pagination ladder a request goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationPath {
    #[default]
    Standard,
    Optimized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub filter: FilterSpec,
    pub search: SearchSpec,
    pub path: PaginationPath,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            filter: FilterSpec::default(),
            search: SearchSpec::default(),
            path: PaginationPath::default(),
        }
    }
}

/// Cursor request: records strictly beyond `last_id` in the requested order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    pub last_id: Option<i64>,
    pub page_size: u64,
    pub sort_order: SortOrder,
    pub filter: FilterSpec,
}

impl Default for RangeRequest {
    fn default() -> Self {
        Self {
            last_id: None,
            page_size: 10,
            sort_order: SortOrder::default(),
            filter: FilterSpec::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub page_size: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Metadata for `page` of a result with `total_records` rows. `page` is
    /// clamped into `[1, total_pages]`.
    pub fn new(page: u64, page_size: u64, total_records: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_records.div_ceil(page_size).max(1);
        let current_page = page.clamp(1, total_pages);
        Self {
            current_page,
            total_pages,
            total_records,
            page_size,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesPage {
    pub records: Vec<SaleRecord>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangePage {
    pub records: Vec<SaleRecord>,
    pub total_records: u64,
    /// Cursor for the next call; `None` when the page came back empty.
    pub last_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: i64,
    pub max: i64,
}

impl Default for AgeRange {
    fn default() -> Self {
        Self { min: 0, max: 100 }
    }
}

/// Values a client can offer in its facet pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub customer_regions: Vec<String>,
    pub genders: Vec<String>,
    pub product_categories: Vec<String>,
    pub payment_methods: Vec<String>,
    pub tags: Vec<String>,
    pub age_range: AgeRange,
}
