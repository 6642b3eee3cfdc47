/// Host clock reading, in seconds.
///
/// The core never reads a wall clock itself; the embedding event loop passes
/// the current time in so timers stay deterministic and replayable.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    /// Time `secs` seconds later. Negative or NaN offsets are treated as zero.
    pub fn after(self, secs: f64) -> Time {
        let secs = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
        Time(self.0 + secs)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn after_ignores_negative_offsets() {
        assert_eq!(Time(2.0).after(1.5), Time(3.5));
        assert_eq!(Time(2.0).after(-1.0), Time(2.0));
        assert_eq!(Time(2.0).after(f64::NAN), Time(2.0));
    }
}
