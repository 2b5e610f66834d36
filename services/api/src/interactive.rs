use gpai_assess::error::AppError;
use gpai_assess::workflows::assessment::classification::proportionality_note;
use gpai_assess::workflows::assessment::{
    Answer, AssessmentSession, Progress, Question, QuestionId, QuestionKind,
};
use std::io::{self, BufRead, Write};

/// Terminal walk over the questionnaire. Invalid answers are reported and the
/// same question is asked again.
pub(crate) struct InteractiveAssessment<R, W> {
    input: R,
    output: W,
    session: AssessmentSession,
}

impl<R: BufRead, W: Write> InteractiveAssessment<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            session: AssessmentSession::new(),
        }
    }

    /// Prompt until the session is terminated or every question on the path is answered.
    pub(crate) fn run(mut self) -> Result<AssessmentSession, AppError> {
        writeln!(
            self.output,
            "GPAI model assessment (EU AI Act). Answer by number or option code."
        )?;

        let mut last_step = 0;
        loop {
            let question = match self.session.progress() {
                Progress::Pending(question) => question,
                Progress::Terminated(_) | Progress::Ready(_) => return Ok(self.session),
            };

            let step = question.stage.step();
            if step != last_step {
                writeln!(self.output, "\nStep {step}: {}", question.stage.label())?;
                last_step = step;
            }
            self.prompt(question)?;

            let line = self.read_line()?;
            let raw = resolve_choice(question, &line);
            match self.session.submit(question.id, &raw) {
                Ok(_) if question.id == QuestionId::ProviderType => self.note_proportionality()?,
                Ok(_) => {}
                Err(err) => writeln!(self.output, "  {err}; please try again.")?,
            }
        }
    }

    fn note_proportionality(&mut self) -> io::Result<()> {
        if let Some(Answer::Choice(option)) = self.session.responses().get(QuestionId::ProviderType) {
            if let Some(note) = proportionality_note(option) {
                writeln!(self.output, "  Note: {note}")?;
            }
        }
        Ok(())
    }

    fn prompt(&mut self, question: &Question) -> io::Result<()> {
        writeln!(self.output, "\n{} ({})", question.prompt, question.reference)?;
        if let Some(help) = question.help {
            writeln!(self.output, "  {help}")?;
        }
        match &question.kind {
            QuestionKind::Choice { options, .. } => {
                for (index, option) in options.iter().enumerate() {
                    writeln!(self.output, "  {}) {} [{}]", index + 1, option.label, option.code)?;
                }
            }
            QuestionKind::FreeText { required: false } => {
                writeln!(self.output, "  (optional, press enter to skip)")?;
            }
            QuestionKind::FreeText { required: true } => {}
        }
        write!(self.output, "> ")?;
        self.output.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the assessment finished",
            ));
        }
        Ok(line.trim().to_string())
    }
}

/// Translate a 1-based option number into its code; anything else passes through.
fn resolve_choice(question: &Question, line: &str) -> String {
    let options = question.options();
    line.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| options.get(index))
        .map(|option| option.code.to_string())
        .unwrap_or_else(|| line.to_string())
}
