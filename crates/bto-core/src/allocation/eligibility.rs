//! Eligibility policy deciding which flat categories a profile may apply for.
//!
//! Pure predicates with no side effects; inventory levels are deliberately
//! not consulted here, so an applicant can be eligible for a category whose
//! units are exhausted.

use super::domain::{FlatCategory, MaritalStatus, UserProfile};

/// Nobody below this age may apply at all.
const MINIMUM_AGE: u8 = 21;

/// Single applicants qualify only from this age, and only for the smallest
/// category.
const SINGLE_MINIMUM_AGE: u8 = 35;

pub fn can_apply(profile: &UserProfile, category: FlatCategory) -> bool {
    if profile.age < MINIMUM_AGE {
        return false;
    }

    match profile.marital_status {
        MaritalStatus::Married => true,
        MaritalStatus::Single => {
            profile.age >= SINGLE_MINIMUM_AGE && category == FlatCategory::smallest()
        }
    }
}

/// Every category the profile may apply for, in display order.
pub fn eligible_categories(profile: &UserProfile) -> Vec<FlatCategory> {
    FlatCategory::ordered()
        .into_iter()
        .filter(|category| can_apply(profile, *category))
        .collect()
}
