// uv index upper bounds paired with their descriptions
const UV_SCALE: [(i32, &str); 5] = [
    (2, "Low"),
    (5, "Moderate"),
    (7, "High"),
    (10, "Very high"),
    (i32::MAX, "Extreme"),
];

pub const INVALID_UV: &str = "Invalid UV index";

/// UV index mapped onto its severity category.
///
/// A negative index only replaces the label: `category` keeps whatever the
/// scan matched, which is 0 for every negative value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvClassification {
    pub value: i32,
    pub category: i32,
    pub label: &'static str,
}

impl UvClassification {
    pub fn summary(&self) -> String {
        format!("{} - {}", self.category, self.label)
    }
}

pub fn classify_uv(value: i32) -> UvClassification {
    let mut category = 0;
    let mut label = INVALID_UV;

    for (i, (cutoff, description)) in UV_SCALE.iter().enumerate() {
        if value <= *cutoff {
            category = i as i32;
            label = *description;
            break;
        }
    }

    if value < 0 {
        label = INVALID_UV;
    }

    UvClassification {
        value,
        category,
        label,
    }
}
