use crate::audio::SampleBuffer;

#[derive(Clone, Debug, PartialEq)]
pub struct Student {
    pub name: String,
    pub recording: Option<SampleBuffer>, // filled once the capture is finalised
}

/// Students in turn order. Append-only until the activity resets.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    // returns the new student's index
    pub fn push(&mut self, name: String) -> usize {
        self.students.push(Student {
            name,
            recording: None,
        });
        self.students.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Student> {
        self.students.get(index)
    }

    pub fn name(&self, index: usize) -> &str {
        self.students.get(index).map_or("", |s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Attach a finished recording. A student's recording is set once and
    /// never replaced; returns false if it was already set or the index is gone.
    pub fn attach_recording(&mut self, index: usize, recording: SampleBuffer) -> bool {
        match self.students.get_mut(index) {
            Some(student) if student.recording.is_none() => {
                student.recording = Some(recording);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.students.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StereoFrame;

    #[test]
    fn push_returns_turn_order() {
        let mut roster = Roster::default();
        assert_eq!(roster.push("Ava".into()), 0);
        assert_eq!(roster.push("Ben".into()), 1);
        assert_eq!(roster.name(1), "Ben");
        assert_eq!(roster.name(5), "");
    }

    #[test]
    fn recording_is_attached_once() {
        let mut roster = Roster::default();
        roster.push("Ava".into());
        let first = SampleBuffer::from_frames(vec![StereoFrame::splat(0.1); 3]);
        let second = SampleBuffer::from_frames(vec![StereoFrame::splat(0.9); 3]);

        assert!(roster.attach_recording(0, first.clone()));
        assert!(!roster.attach_recording(0, second));
        assert!(!roster.attach_recording(4, SampleBuffer::default()));
        assert_eq!(roster.get(0).and_then(|s| s.recording.as_ref()), Some(&first));
    }

    #[test]
    fn clear_empties_the_roster() {
        let mut roster = Roster::default();
        roster.push("Ava".into());
        roster.clear();
        assert!(roster.is_empty());
    }
}
