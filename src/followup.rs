// src/followup.rs
use std::collections::HashSet;

use crate::categorize::SopAssignment;

/// Follow-up actions for the fired categories: category order, first occurrence kept.
pub fn plan_follow_ups(assignments: &[SopAssignment]) -> Vec<String> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .flat_map(|a| a.category.follow_ups.iter().copied())
        .filter(|action| seen.insert(*action))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::assign_categories;
    use crate::taxonomy::{COMMERCIAL_LAUNCH, PRICING_ACCESS};

    #[test]
    fn empty_categories_yield_no_actions() {
        assert!(plan_follow_ups(&[]).is_empty());
    }

    #[test]
    fn shared_actions_appear_once_in_category_order() {
        let a = assign_categories("Launch at a list price 30% below the reference product");
        assert_eq!(a.len(), 2);
        let actions = plan_follow_ups(&a);

        let expected_len = COMMERCIAL_LAUNCH.follow_ups.len() + PRICING_ACCESS.follow_ups.len() - 1;
        assert_eq!(actions.len(), expected_len);
        assert_eq!(actions[0], COMMERCIAL_LAUNCH.follow_ups[0]);
        assert_eq!(
            actions.iter().filter(|s| *s == "Capture launch pricing and channel strategy").count(),
            1
        );
        assert_eq!(actions.last().map(String::as_str), Some(PRICING_ACCESS.follow_ups[0]));
    }
}
