#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::ast::{Condition, Pattern, Predicate};
    use crate::{Accumulator, Ordering, Projection, SortDir, Stage};
    use serde_json::json;

    fn region_in(values: &[&str]) -> Predicate {
        Predicate::field(
            "Customer Region",
            Condition::In(values.iter().map(|v| json!(v)).collect()),
        )
    }

    #[test]
    fn test_all_is_universal() {
        assert!(Predicate::All.is_universal());
        assert!(Predicate::And(vec![]).is_universal());
        assert!(Predicate::And(vec![Predicate::All, Predicate::All]).is_universal());
        assert!(!region_in(&["North"]).is_universal());
        // An empty disjunction matches nothing, so it is not universal.
        assert!(!Predicate::Or(vec![]).is_universal());
    }

    #[test]
    fn test_all_of_absorbs_universal_operands() {
        assert_eq!(Predicate::all_of(vec![]), Predicate::All);
        assert_eq!(
            Predicate::all_of(vec![Predicate::All, region_in(&["East"])]),
            region_in(&["East"])
        );

        let both = Predicate::all_of(vec![region_in(&["East"]), region_in(&["West"])]);
        match both {
            Predicate::And(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn test_and_with_universal_keeps_other_side() {
        let p = Predicate::All.and(region_in(&["South"]));
        assert_eq!(p, region_in(&["South"]));
    }

    #[test]
    fn test_literal_pattern_escapes_metacharacters() {
        let p = Pattern::literal("a.b(c)", true).unwrap();
        assert!(p.is_match("xxA.B(C)yy"));
        assert!(!p.is_match("aXb(c)"));
    }

    #[test]
    fn test_any_literal_pattern_matches_each_alternative() {
        let p = Pattern::any_literal(&["organic", "eco-friendly"], true).unwrap();
        assert!(p.as_str().starts_with("organic|"));
        assert!(p.is_match("fashion,Organic"));
        assert!(p.is_match("ECO-FRIENDLY"));
        assert!(!p.is_match("casual,unisex"));
    }

    #[test]
    fn test_pattern_equality_ignores_compiled_state() {
        let a = Pattern::literal("john", true).unwrap();
        let b = Pattern::literal("john", true).unwrap();
        let c = Pattern::literal("john", false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_predicate_to_native_shapes() {
        let p = Predicate::And(vec![
            region_in(&["North"]),
            Predicate::field("Age", Condition::Gte(json!(18))),
            Predicate::Or(vec![Predicate::field(
                "Customer Name",
                Condition::Matches(Pattern::literal("ann", true).unwrap()),
            )]),
        ]);

        assert_eq!(
            p.to_native(),
            json!({
                "$and": [
                    { "Customer Region": { "$in": ["North"] } },
                    { "Age": { "$gte": 18 } },
                    { "$or": [ { "Customer Name": { "$regex": "ann", "$options": "i" } } ] }
                ]
            })
        );
        assert_eq!(Predicate::All.to_native(), json!({}));
    }

    #[test]
    fn test_ordering_ensure_tiebreaker() {
        let order = Ordering::by("Date", SortDir::Desc).ensure_tiebreaker("Transaction ID", SortDir::Desc);
        assert_eq!(order.keys().len(), 2);
        assert_eq!(order.keys()[1].field, "Transaction ID");
        assert_eq!(order.to_signed_tokens(), "-Date,-Transaction ID");
    }

    #[test]
    fn test_ordering_ensure_tiebreaker_already_present() {
        let order = Ordering::by("Transaction ID", SortDir::Asc)
            .ensure_tiebreaker("Transaction ID", SortDir::Desc);
        assert_eq!(order.keys().len(), 1);
        // original direction preserved
        assert_eq!(order.keys()[0].dir, SortDir::Asc);
    }

    #[test]
    fn test_sort_dir_sign_and_reverse() {
        assert_eq!(SortDir::Asc.sign(), 1);
        assert_eq!(SortDir::Desc.sign(), -1);
        assert_eq!(SortDir::Asc.reverse(), SortDir::Desc);
    }

    #[test]
    fn test_stage_to_native() {
        assert_eq!(Stage::Skip(5).to_native(), json!({ "$skip": 5 }));
        assert_eq!(
            Stage::Sample(10_000).to_native(),
            json!({ "$sample": { "size": 10_000 } })
        );
        assert_eq!(
            Stage::Project(vec![Projection::new("id", "Transaction ID")]).to_native(),
            json!({ "$project": { "id": "$Transaction ID" } })
        );
        assert_eq!(
            Stage::Group(vec![
                ("minAge".to_string(), Accumulator::Min("Age".to_string())),
                ("maxAge".to_string(), Accumulator::Max("Age".to_string())),
            ])
            .to_native(),
            json!({ "$group": { "_id": null, "minAge": { "$min": "$Age" }, "maxAge": { "$max": "$Age" } } })
        );
    }
}
