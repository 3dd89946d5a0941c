// Content categories
//
// Closed set. Free-form strings are parsed at the boundary; anything
// unrecognised is a ValidationError rather than a silent default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    TechnologyGaming,
    HealthFitness,
    FoodCooking,
    TravelLifestyle,
    EducationScience,
    EntertainmentPopculture,
    BusinessFinance,
    ArtsCrafts,
    ParentingFamily,
    FashionBeauty,
    SpaceExploration,
    Wellness,
    Nutrition,
    EarthMysteries,
    General,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 15] = [
        Self::TechnologyGaming,
        Self::HealthFitness,
        Self::FoodCooking,
        Self::TravelLifestyle,
        Self::EducationScience,
        Self::EntertainmentPopculture,
        Self::BusinessFinance,
        Self::ArtsCrafts,
        Self::ParentingFamily,
        Self::FashionBeauty,
        Self::SpaceExploration,
        Self::Wellness,
        Self::Nutrition,
        Self::EarthMysteries,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnologyGaming => "technology_gaming",
            Self::HealthFitness => "health_fitness",
            Self::FoodCooking => "food_cooking",
            Self::TravelLifestyle => "travel_lifestyle",
            Self::EducationScience => "education_science",
            Self::EntertainmentPopculture => "entertainment_popculture",
            Self::BusinessFinance => "business_finance",
            Self::ArtsCrafts => "arts_crafts",
            Self::ParentingFamily => "parenting_family",
            Self::FashionBeauty => "fashion_beauty",
            Self::SpaceExploration => "space_exploration",
            Self::Wellness => "wellness",
            Self::Nutrition => "nutrition",
            Self::EarthMysteries => "earth_mysteries",
            Self::General => "general",
        }
    }

    /// Value stored under `domain_data.content_category`, for categories that carry one.
    pub fn domain_tag(&self) -> Option<&'static str> {
        match self {
            Self::SpaceExploration => Some("space_exploration"),
            Self::Wellness => Some("health_wellness"),
            Self::Nutrition => Some("nutrition_health"),
            _ => None,
        }
    }
}

impl Default for ContentCategory {
    fn default() -> Self {
        Self::General
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = ValidationError;

    /// Accepts the snake_case tag in any case, with spaces or dashes for underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.trim().to_string()))
    }
}
