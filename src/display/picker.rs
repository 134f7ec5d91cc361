use crate::hardware::fan::defs::TimerDuration;

/// Modal hour/minute picker for the power-off timer.
#[derive(Clone, Debug, PartialEq)]
pub struct TimerPicker {
    value: TimerDuration,
    field: Field,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Hours,
    Minutes,
}

impl TimerPicker {
    pub fn new(initial: TimerDuration) -> Self {
        Self {
            value: initial,
            field: Field::default(),
        }
    }

    pub fn value(&self) -> TimerDuration {
        self.value
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            Field::Hours => Field::Minutes,
            Field::Minutes => Field::Hours,
        };
    }

    pub fn step(&mut self, delta: i8) {
        match self.field {
            Field::Hours => self.value.add_hours(delta),
            Field::Minutes => self.value.add_minutes(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_steps() {
        let mut picker = TimerPicker::new(TimerDuration::DEFAULT);

        picker.step(1);
        assert_eq!(picker.value(), TimerDuration::new(1, 30).unwrap());

        picker.toggle_field();
        assert_eq!(picker.field(), Field::Minutes);

        picker.step(-31);
        assert_eq!(picker.value(), TimerDuration::new(1, 59).unwrap());
        assert_eq!(picker.value().as_secs(), 7140);
    }
}
