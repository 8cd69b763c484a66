// beaufort scale upper bounds in m/s, paired with their descriptions
const BEAUFORT_SCALE: [(f64, &str); 13] = [
    (0.4, "Calm"),
    (1.5, "Light air"),
    (3.3, "Light breeze"),
    (5.5, "Gentle breeze"),
    (7.9, "Moderate breeze"),
    (10.7, "Fresh breeze"),
    (13.8, "Strong breeze"),
    (17.1, "Near gale"),
    (20.7, "Gale"),
    (24.4, "Severe gale"),
    (28.4, "Storm"),
    (32.6, "Violent storm"),
    (f64::INFINITY, "Hurricane"),
];

pub const INVALID_WIND: &str = "Invalid wind speed";

/// Wind speed mapped onto the Beaufort scale.
///
/// `category` is -1 when the speed is negative or not comparable (NaN).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindClassification {
    pub speed: f64,
    pub category: i32,
    pub label: &'static str,
}

impl WindClassification {
    // formats the classification the way the display shows it, like "3 - Gentle breeze"
    pub fn summary(&self) -> String {
        format!("{} - {}", self.category, self.label)
    }

    pub fn is_valid(&self) -> bool {
        self.category >= 0
    }
}

// classifies a wind speed in m/s using the first cutoff that is >= the speed
pub fn classify_wind(speed: f64) -> WindClassification {
    let mut category = -1;
    let mut label = INVALID_WIND;

    for (i, (cutoff, description)) in BEAUFORT_SCALE.iter().enumerate() {
        if speed <= *cutoff {
            category = i as i32;
            label = *description;
            break;
        }
    }

    // negative speeds can still match the first cutoff, so override after the scan
    if speed < 0.0 {
        category = -1;
        label = INVALID_WIND;
    }

    WindClassification {
        speed,
        category,
        label,
    }
}
