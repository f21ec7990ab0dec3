// Proof that the user confirmed a destructive action.
//
// Destructive operations (clear month, delete record) take a Confirmation by
// value, so the network call cannot be reached without the confirmation step.

#[derive(Debug)]
pub struct Confirmation {
    prompt: String,
}

impl Confirmation {
    /// Returns a confirmation only when the user accepted the prompt.
    pub fn from_answer(prompt: impl Into<String>, accepted: bool) -> Option<Self> {
        accepted.then(|| Self {
            prompt: prompt.into(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[cfg(test)]
mod confirmation_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn it_should_only_exist_for_accepted_prompts(#[case] accepted: bool, #[case] exists: bool) {
        let confirmation = Confirmation::from_answer("Clear June 2024?", accepted);
        assert_eq!(confirmation.is_some(), exists);
    }

    #[rstest]
    fn it_should_remember_the_prompt() {
        let confirmation = Confirmation::from_answer("Delete client?", true).unwrap();
        assert_eq!(confirmation.prompt(), "Delete client?");
    }
}
