use foundation::time::Time;

/// One display refresh, stamped with the host clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    pub time: Time,
}

impl Frame {
    pub fn at(index: u64, time: Time, previous: Time) -> Self {
        Self {
            index,
            dt_s: time.since(previous),
            time,
        }
    }
}
