use std::fmt;

// openweathermap reports a 1-5 index; the last label is kept as the api documents it
const CATEGORIES: [&str; 5] = ["Good", "Fair", "Moderate", "Poor", "Low"];

/// Pollutants that can be reported as the main contributor to a bad reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    No2,
    Pm10,
    O3,
    Pm25,
}

impl Pollutant {
    // evaluation order, which is also the tie-break order
    pub const ALL: [Pollutant; 4] = [Pollutant::No2, Pollutant::Pm10, Pollutant::O3, Pollutant::Pm25];

    pub fn name(self) -> &'static str {
        match self {
            Pollutant::No2 => "no2",
            Pollutant::Pm10 => "pm10",
            Pollutant::O3 => "o3",
            Pollutant::Pm25 => "pm2.5",
        }
    }

    /// CAQI hourly grid in µg/m³. The first entry is always 0.
    pub fn cutoffs(self) -> &'static [f64; 5] {
        match self {
            Pollutant::No2 => &[0.0, 50.0, 100.0, 200.0, 400.0],
            Pollutant::Pm10 => &[0.0, 25.0, 50.0, 90.0, 180.0],
            Pollutant::O3 => &[0.0, 60.0, 120.0, 180.0, 240.0],
            Pollutant::Pm25 => &[0.0, 15.0, 30.0, 55.0, 110.0],
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pollutant concentrations in µg/m³, as reported alongside the index.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Concentrations {
    pub no2: f64,
    pub pm10: f64,
    pub o3: f64,
    pub pm2_5: f64,
}

impl Concentrations {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::No2 => self.no2,
            Pollutant::Pm10 => self.pm10,
            Pollutant::O3 => self.o3,
            Pollutant::Pm25 => self.pm2_5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityClassification {
    /// Index after clamping to 1..=5.
    pub index: i32,
    pub label: &'static str,
    pub dominant_pollutant: Option<Pollutant>,
}

impl AirQualityClassification {
    // formats as "3 - Moderate (o3)", leaving out the pollutant when there is none
    pub fn summary(&self) -> String {
        match self.dominant_pollutant {
            Some(pollutant) => format!("{} - {} ({})", self.index, self.label, pollutant),
            None => format!("{} - {}", self.index, self.label),
        }
    }
}

/// Continuous severity of a concentration on a 5-point scale.
///
/// Inside the scale this interpolates linearly between neighbouring bands,
/// so a value sitting exactly on `cutoffs[i]` scores `i`. Past the top of the
/// scale it switches to `c / cutoffs[4] * 5`, which is not continuous with
/// the interpolated part.
pub fn severity(concentration: f64, cutoffs: &[f64; 5]) -> f64 {
    let mut score = 0.0;

    for index in 1..cutoffs.len() {
        if concentration <= cutoffs[index] {
            score = index as f64
                + (concentration - cutoffs[index]) / (cutoffs[index] - cutoffs[index - 1]);
            break;
        }
    }

    if concentration > cutoffs[4] {
        score = concentration / cutoffs[4] * 5.0;
    }

    score
}

// picks the pollutant with the strictly highest severity, earlier ones win ties
pub fn dominant_pollutant(concentrations: &Concentrations) -> Pollutant {
    let mut dominant = Pollutant::ALL[0];
    let mut max_severity = severity(concentrations.get(dominant), dominant.cutoffs());

    for pollutant in &Pollutant::ALL[1..] {
        let score = severity(concentrations.get(*pollutant), pollutant.cutoffs());
        if score > max_severity {
            dominant = *pollutant;
            max_severity = score;
        }
    }

    dominant
}

pub fn classify_air_quality(raw_index: i32, concentrations: Concentrations) -> AirQualityClassification {
    let index = raw_index.clamp(1, 5);
    let label = CATEGORIES[(index - 1) as usize];

    // good air never needs a pollutant explanation
    if index == 1 {
        return AirQualityClassification {
            index,
            label,
            dominant_pollutant: None,
        };
    }

    AirQualityClassification {
        index,
        label,
        dominant_pollutant: Some(dominant_pollutant(&concentrations)),
    }
}
