/// Fixed-capacity ring buffer; pushing beyond capacity evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        Self {
            capacity,
            buffer: vec![0.0; capacity],
            head: 0,
            count: 0,
        }
    }

    /// Push a value, returning the evicted one once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.count >= self.capacity {
            Some(self.buffer[self.head])
        } else {
            self.count += 1;
            None
        };
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        evicted
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn start(&self) -> usize {
        if self.count < self.capacity {
            0
        } else {
            self.head
        }
    }

    /// Oldest retained value.
    pub fn oldest(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.buffer[self.start()])
        }
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.buffer[(self.head + self.capacity - 1) % self.capacity])
        }
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = self.start();
        (0..self.count).map(move |i| self.buffer[(start + i) % self.capacity])
    }

    /// Arithmetic mean of the retained values.
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.count as f64)
    }

    /// Population (ddof = 0) standard deviation of the retained values.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .iter()
            .map(|p| {
                let d = p - mean;
                d * d
            })
            .sum::<f64>()
            / self.count as f64;
        Some(variance.sqrt())
    }
}
