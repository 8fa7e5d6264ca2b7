use serde::{Deserialize, Serialize};

use crate::contract::model::{
    AgeRange, FilterOptions, FilterSpec, PageRequest, PaginationMeta, PaginationPath, RangePage,
    RangeRequest, SaleRecord, SalesPage, SearchSpec, SortKey, SortOrder,
};
use crate::domain::service::ServiceConfig;

/// REST DTO for one sales record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecordDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub page_size: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// REST DTO for a page of sales
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPageDto {
    pub data: Vec<SaleRecordDto>,
    pub pagination: PaginationDto,
}

/// REST DTO for a cursor slice
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePageDto {
    pub data: Vec<SaleRecordDto>,
    pub total_records: u64,
    pub last_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRangeDto {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionsDto {
    pub customer_regions: Vec<String>,
    pub genders: Vec<String>,
    pub product_categories: Vec<String>,
    pub payment_methods: Vec<String>,
    pub tags: Vec<String>,
    pub age_range: AgeRangeDto,
}

/// Query parameters shared by the page endpoints. Everything arrives as text
/// and is coerced leniently: unparseable values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub facets: FacetQuery,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub last_id: Option<String>,
    pub limit: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub facets: FacetQuery,
}

/// Comma-separated facet selections and range bounds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetQuery {
    pub customer_region: Option<String>,
    pub gender: Option<String>,
    pub product_category: Option<String>,
    pub tags: Option<String>,
    pub payment_method: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SalesQuery {
    pub fn into_request(self, path: PaginationPath, cfg: &ServiceConfig) -> PageRequest {
        PageRequest {
            page: parse_positive(self.page.as_deref()).unwrap_or(1),
            page_size: page_size(self.limit.as_deref(), cfg),
            sort_key: self.sort_by.as_deref().map(SortKey::parse).unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            filter: self.facets.into_filter(),
            search: SearchSpec::new(self.search.unwrap_or_default()),
            path,
        }
    }
}

impl RangeQuery {
    pub fn into_request(self, cfg: &ServiceConfig) -> RangeRequest {
        RangeRequest {
            last_id: self.last_id.as_deref().and_then(parse_int),
            page_size: page_size(self.limit.as_deref(), cfg),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            filter: self.facets.into_filter(),
        }
    }
}

impl FacetQuery {
    pub fn into_filter(self) -> FilterSpec {
        FilterSpec {
            customer_regions: split_list(self.customer_region.as_deref()),
            genders: split_list(self.gender.as_deref()),
            product_categories: split_list(self.product_category.as_deref()),
            tags: split_list(self.tags.as_deref()),
            payment_methods: split_list(self.payment_method.as_deref()),
            age_min: self.min_age.as_deref().and_then(parse_int),
            age_max: self.max_age.as_deref().and_then(parse_int),
            date_start: non_empty(self.start_date),
            date_end: non_empty(self.end_date),
        }
    }
}

fn page_size(raw: Option<&str>, cfg: &ServiceConfig) -> u64 {
    parse_positive(raw)
        .unwrap_or(cfg.default_page_size)
        .min(cfg.max_page_size)
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(parse_int)
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n >= 1)
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// Conversion implementations between REST DTOs and contract models

impl From<SaleRecord> for SaleRecordDto {
    fn from(r: SaleRecord) -> Self {
        Self {
            id: r.id,
            date: r.date,
            customer_id: r.customer_id,
            customer_name: r.customer_name,
            phone_number: r.phone_number,
            gender: r.gender,
            age: r.age,
            customer_region: r.customer_region,
            product_category: r.product_category,
            quantity: r.quantity,
            total_amount: r.total_amount,
            product_id: r.product_id,
            employee_name: r.employee_name,
            payment_method: r.payment_method,
            tags: r.tags,
        }
    }
}

impl From<PaginationMeta> for PaginationDto {
    fn from(m: PaginationMeta) -> Self {
        Self {
            current_page: m.current_page,
            total_pages: m.total_pages,
            total_records: m.total_records,
            page_size: m.page_size,
            has_next_page: m.has_next_page,
            has_previous_page: m.has_previous_page,
        }
    }
}

impl From<SalesPage> for SalesPageDto {
    fn from(p: SalesPage) -> Self {
        Self {
            data: p.records.into_iter().map(SaleRecordDto::from).collect(),
            pagination: p.pagination.into(),
        }
    }
}

impl From<RangePage> for RangePageDto {
    fn from(p: RangePage) -> Self {
        Self {
            data: p.records.into_iter().map(SaleRecordDto::from).collect(),
            total_records: p.total_records,
            last_id: p.last_id,
        }
    }
}

impl From<AgeRange> for AgeRangeDto {
    fn from(r: AgeRange) -> Self {
        Self {
            min: r.min,
            max: r.max,
        }
    }
}

impl From<&FilterOptions> for FilterOptionsDto {
    fn from(o: &FilterOptions) -> Self {
        Self {
            customer_regions: o.customer_regions.clone(),
            genders: o.genders.clone(),
            product_categories: o.product_categories.clone(),
            payment_methods: o.payment_methods.clone(),
            tags: o.tags.clone(),
            age_range: o.age_range.into(),
        }
    }
}
