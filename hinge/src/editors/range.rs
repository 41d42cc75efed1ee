//! Slider and two-thumb range math.

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::geometry::Rect;

/// Bounds and step of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }
}

impl SliderConfig {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(WidgetError::invalid_config("slider", "bounds must be finite"));
        }
        if self.min >= self.max {
            return Err(WidgetError::invalid_config(
                "slider",
                format!("min {} must be below max {}", self.min, self.max),
            ));
        }
        if self.step <= 0.0 {
            return Err(WidgetError::invalid_config(
                "slider",
                format!("step {} must be positive", self.step),
            ));
        }
        Ok(())
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Clamp to `[min, max]`, then round to the nearest multiple of `step`
    /// counted from `min`.
    pub fn snap(&self, raw: f64) -> f64 {
        let clamped = self.clamp(raw);
        let steps = ((clamped - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Position of `value` within the bounds, from 0.0 to 1.0.
    pub fn fraction_of(&self, value: f64) -> f64 {
        ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Where the track sits along its axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub start: f64,
    pub length: f64,
}

impl TrackGeometry {
    pub fn new(start: f64, length: f64) -> Self {
        Self { start, length }
    }

    /// Horizontal track covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            start: f64::from(rect.x),
            length: f64::from(rect.width),
        }
    }

    /// Fraction of the track at `pointer`, clamped to 0.0..=1.0.
    pub fn fraction_at(&self, pointer: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        ((pointer - self.start) / self.length).clamp(0.0, 1.0)
    }

    /// Snapped value under `pointer`.
    pub fn value_at(&self, pointer: f64, config: &SliderConfig) -> f64 {
        let raw = config.min + self.fraction_at(pointer) * (config.max - config.min);
        config.snap(raw)
    }

    /// Pointer position that corresponds to `value`.
    pub fn position_of(&self, value: f64, config: &SliderConfig) -> f64 {
        self.start + config.fraction_of(value) * self.length
    }
}

/// One of the two range thumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thumb {
    Low,
    High,
}

/// A `[low, high]` pair. Writes that would invert the pair swap it instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    low: f64,
    high: f64,
}

impl RangeValue {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn get(&self, thumb: Thumb) -> f64 {
        match thumb {
            Thumb::Low => self.low,
            Thumb::High => self.high,
        }
    }

    /// Write one end. Returns the thumb that now holds `value`, which is the
    /// other one if the thumbs crossed.
    pub fn set(&mut self, thumb: Thumb, value: f64) -> Thumb {
        match thumb {
            Thumb::Low => self.low = value,
            Thumb::High => self.high = value,
        }
        if self.low > self.high {
            std::mem::swap(&mut self.low, &mut self.high);
            return match thumb {
                Thumb::Low => Thumb::High,
                Thumb::High => Thumb::Low,
            };
        }
        thumb
    }

    /// The thumb closest to `value`. Ties prefer the side `value` lies on.
    pub fn nearest(&self, value: f64) -> Thumb {
        let to_low = (value - self.low).abs();
        let to_high = (value - self.high).abs();
        if to_low < to_high {
            Thumb::Low
        } else if to_high < to_low || value > self.high {
            Thumb::High
        } else {
            Thumb::Low
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.low, self.high]
    }
}

impl From<[f64; 2]> for RangeValue {
    fn from([a, b]: [f64; 2]) -> Self {
        Self::new(a, b)
    }
}

/// Pointer and keyboard interaction for a two-thumb range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEditor {
    config: SliderConfig,
    value: RangeValue,
    dragging: Option<Thumb>,
}

impl RangeEditor {
    pub fn new(config: SliderConfig, initial: RangeValue) -> Self {
        let value = RangeValue::new(config.snap(initial.low), config.snap(initial.high));
        Self {
            config,
            value,
            dragging: None,
        }
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    pub fn value(&self) -> RangeValue {
        self.value
    }

    /// Replace the value, e.g. when a controlled host re-supplies it.
    pub fn sync(&mut self, value: RangeValue) {
        self.value = RangeValue::new(self.config.snap(value.low), self.config.snap(value.high));
    }

    pub fn dragging(&self) -> Option<Thumb> {
        self.dragging
    }

    /// Move `thumb` to the value under `pointer`. The drag follows the thumb
    /// across a crossing.
    pub fn drag(&mut self, thumb: Thumb, pointer: f64, track: &TrackGeometry) -> RangeValue {
        let target = track.value_at(pointer, &self.config);
        let now_holding = self.value.set(thumb, target);
        self.dragging = Some(now_holding);
        self.value
    }

    /// Press on the track away from a thumb: the nearer thumb jumps to the
    /// pointer and starts dragging.
    pub fn press_track(&mut self, pointer: f64, track: &TrackGeometry) -> RangeValue {
        let target = track.value_at(pointer, &self.config);
        let thumb = self.value.nearest(target);
        self.drag(thumb, pointer, track)
    }

    /// Continue an active drag. Does nothing without one.
    pub fn drag_to(&mut self, pointer: f64, track: &TrackGeometry) -> Option<RangeValue> {
        let thumb = self.dragging?;
        Some(self.drag(thumb, pointer, track))
    }

    pub fn release(&mut self) {
        self.dragging = None;
    }

    /// Keyboard nudge by whole steps.
    pub fn step(&mut self, thumb: Thumb, steps: i32) -> RangeValue {
        let target = self
            .config
            .snap(self.value.get(thumb) + f64::from(steps) * self.config.step);
        self.value.set(thumb, target);
        self.value
    }
}

/// Single-thumb slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    config: SliderConfig,
    value: f64,
}

impl Slider {
    pub fn new(config: SliderConfig, initial: f64) -> Self {
        Self {
            config,
            value: config.snap(initial),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_from_pointer(&mut self, pointer: f64, track: &TrackGeometry) -> f64 {
        self.value = track.value_at(pointer, &self.config);
        self.value
    }

    pub fn step(&mut self, steps: i32) -> f64 {
        self.value = self
            .config
            .snap(self.value + f64::from(steps) * self.config.step);
        self.value
    }
}
