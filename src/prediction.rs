pub const SIMULATED_WARNING: &str = "This is a simulated result.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub disease: &'static str,
}

impl Prediction {
    pub fn summary(&self) -> String {
        format!("Predicted Disease: {}", self.disease)
    }
}

pub fn predict(symptoms: &str) -> Option<Prediction> {
    let any = symptoms.split(',').any(|s| !s.trim().is_empty());
    any.then_some(Prediction { disease: "Flu" })
}
