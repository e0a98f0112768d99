//! The hourly axis drawn behind the week grid.

use crate::week::{adjust_duration, ruler_units};

const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct RulerBar {
    pub offset: f64,
    pub extent: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ruler {
    pub bars: Vec<RulerBar>,
    /// Height of a full day, in ruler units
    pub height: f64,
}

impl Ruler {
    pub fn new() -> Self {
        let bars = (0..HOURS_PER_DAY)
            .map(|hour| RulerBar {
                offset: ruler_units(f64::from(hour * 60)),
                extent: ruler_units(adjust_duration(60.0)),
                label: format!("{hour}:00"),
            })
            .collect();

        Ruler {
            bars,
            height: ruler_units(f64::from(HOURS_PER_DAY * 60)),
        }
    }
}

impl Default for Ruler {
    fn default() -> Self {
        Self::new()
    }
}
