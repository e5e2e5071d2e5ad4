use crate::error::AnnotationError;
use crate::image_classifier::interface::Prediction;
use std::fmt;
use std::str::FromStr;

/// The reviewer's verdict on the model's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiAccuracy {
    Correct,
    Incorrect,
    Partial,
    #[default]
    Unset,
}

impl AiAccuracy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiAccuracy::Correct => "CORRECT",
            AiAccuracy::Incorrect => "INCORRECT",
            AiAccuracy::Partial => "PARTIAL",
            AiAccuracy::Unset => "",
        }
    }
}

impl fmt::Display for AiAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiAccuracy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CORRECT" => Ok(AiAccuracy::Correct),
            "INCORRECT" => Ok(AiAccuracy::Incorrect),
            "PARTIAL" => Ok(AiAccuracy::Partial),
            "" => Ok(AiAccuracy::Unset),
            other => Err(format!("unknown accuracy {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualAnnotation {
    pub object_in_hand: String,
    pub ai_accuracy: AiAccuracy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationField {
    ObjectInHand(String),
    AiAccuracy(AiAccuracy),
}

/// A submitted annotation together with the predictions it judged.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedAnnotation {
    pub annotation: ManualAnnotation,
    pub ai_predictions: Vec<Prediction>,
}

impl SavedAnnotation {
    /// The user's asserted ground truth, when they marked the model wrong.
    pub fn discrepancy(&self) -> Option<&str> {
        match self.annotation.ai_accuracy {
            AiAccuracy::Incorrect => Some(self.annotation.object_in_hand.as_str()),
            _ => None,
        }
    }
}

/// Manual review of one capture instance: Hidden → Collecting → Saved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnnotationWorkflow {
    #[default]
    Hidden,
    Collecting(ManualAnnotation),
    Saved(SavedAnnotation),
}

impl AnnotationWorkflow {
    /// Opens an empty form, discarding any saved record.
    pub fn open_form(&mut self) {
        *self = AnnotationWorkflow::Collecting(ManualAnnotation::default());
    }

    pub fn update_field(&mut self, field: AnnotationField) -> Result<(), AnnotationError> {
        let AnnotationWorkflow::Collecting(form) = self else {
            return Err(AnnotationError::NotCollecting);
        };
        match field {
            AnnotationField::ObjectInHand(value) => form.object_in_hand = value,
            AnnotationField::AiAccuracy(value) => form.ai_accuracy = value,
        }
        Ok(())
    }

    /// Saves the form with a copy of `predictions` as they are right now.
    pub fn submit(&mut self, predictions: &[Prediction]) -> Result<(), AnnotationError> {
        let AnnotationWorkflow::Collecting(form) = self else {
            return Err(AnnotationError::NotCollecting);
        };
        let annotation = std::mem::take(form);
        *self = AnnotationWorkflow::Saved(SavedAnnotation {
            annotation,
            ai_predictions: predictions.to_vec(),
        });
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = AnnotationWorkflow::Hidden;
    }

    #[cfg(test)]
    pub fn form(&self) -> Option<&ManualAnnotation> {
        match self {
            AnnotationWorkflow::Collecting(form) => Some(form),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn saved(&self) -> Option<&SavedAnnotation> {
        match self {
            AnnotationWorkflow::Saved(saved) => Some(saved),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions() -> Vec<Prediction> {
        vec![
            Prediction::new("coffee mug", 0.6),
            Prediction::new("cup", 0.3),
        ]
    }

    #[test]
    fn test_round_trip_with_snapshot() {
        let mut workflow = AnnotationWorkflow::default();
        let mut live = predictions();

        workflow.open_form();
        workflow
            .update_field(AnnotationField::ObjectInHand("cup".to_string()))
            .unwrap();
        workflow
            .update_field(AnnotationField::AiAccuracy(AiAccuracy::Partial))
            .unwrap();
        workflow.submit(&live).unwrap();

        live[0].probability = 0.01;
        live.clear();

        let saved = workflow.saved().unwrap();
        assert_eq!(saved.annotation.object_in_hand, "cup");
        assert_eq!(saved.annotation.ai_accuracy, AiAccuracy::Partial);
        assert_eq!(saved.ai_predictions, predictions());
        assert_eq!(saved.discrepancy(), None);
    }

    #[test]
    fn test_updates_rejected_outside_collecting() {
        let mut workflow = AnnotationWorkflow::default();
        assert_eq!(
            workflow.update_field(AnnotationField::ObjectInHand("cup".to_string())),
            Err(AnnotationError::NotCollecting)
        );
        assert_eq!(
            workflow.submit(&predictions()).err(),
            Some(AnnotationError::NotCollecting)
        );
        assert_eq!(workflow, AnnotationWorkflow::Hidden);
    }

    #[test]
    fn test_reopening_discards_saved_record() {
        let mut workflow = AnnotationWorkflow::default();
        workflow.open_form();
        workflow
            .update_field(AnnotationField::ObjectInHand("pen".to_string()))
            .unwrap();
        workflow.submit(&predictions()).unwrap();

        workflow.open_form();

        assert_eq!(workflow.saved(), None);
        assert_eq!(workflow.form(), Some(&ManualAnnotation::default()));
    }

    #[test]
    fn test_empty_values_are_accepted() {
        let mut workflow = AnnotationWorkflow::default();
        workflow.open_form();
        workflow
            .update_field(AnnotationField::ObjectInHand(String::new()))
            .unwrap();
        workflow.submit(&[]).unwrap();
        let saved = workflow.saved().unwrap();

        assert_eq!(saved.annotation, ManualAnnotation::default());
        assert!(saved.ai_predictions.is_empty());
    }

    #[test]
    fn test_incorrect_flags_discrepancy() {
        let mut workflow = AnnotationWorkflow::default();
        workflow.open_form();
        workflow
            .update_field(AnnotationField::ObjectInHand("stapler".to_string()))
            .unwrap();
        workflow
            .update_field(AnnotationField::AiAccuracy(AiAccuracy::Incorrect))
            .unwrap();

        workflow.submit(&predictions()).unwrap();
        let saved = workflow.saved().unwrap();

        assert_eq!(saved.discrepancy(), Some("stapler"));
    }

    #[test]
    fn test_reset_hides_everything() {
        let mut workflow = AnnotationWorkflow::default();
        workflow.open_form();
        workflow.reset();
        assert_eq!(workflow, AnnotationWorkflow::Hidden);
    }

    #[test]
    fn test_parse_accuracy() {
        assert_eq!("incorrect".parse::<AiAccuracy>(), Ok(AiAccuracy::Incorrect));
        assert_eq!("".parse::<AiAccuracy>(), Ok(AiAccuracy::Unset));
        assert!("maybe".parse::<AiAccuracy>().is_err());
        assert_eq!(AiAccuracy::Partial.to_string(), "PARTIAL");
    }
}
