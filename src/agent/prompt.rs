//! Prompt rendering for the reviewing agent.
//!
//! Both messages are `minijinja` templates. The change set and the existing
//! comments are embedded as pretty-printed JSON.

use minijinja::{Environment, context};

use crate::bitbucket::models::ExistingComment;
use crate::error::ReviewError;
use crate::review::change_set::ChangeSet;
use crate::review::model::ReviewInstruction;

const SYSTEM_TEMPLATE: &str = "\
You are a code reviewer.
Your role is to help developers improve their code.
You will receive an annotated diff with the code changes to be reviewed, and you should respond with feedback on the code.
Comment only on what needs improvement.
Comment only on added lines, never on deleted ones.
Do not include any comment similar to one that has already been made.
Format the comment text in markdown.
Always use an empathetic and educational writing style.
Respond in the {{ comment_language }} language.


Below are the project guidelines:
{{ instruction_text }}";

const USER_TEMPLATE: &str = "\
Here are the current comments on the pull request:

{{ existing_comments }}

Now, here is the diff:

{{ change_set }}";

fn environment() -> Result<Environment<'static>, ReviewError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    for (name, source) in [("system", SYSTEM_TEMPLATE), ("user", USER_TEMPLATE)] {
        env.add_template(name, source)
            .map_err(|e| ReviewError::Configuration {
                message: format!("invalid prompt template: {e}"),
            })?;
    }
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, ReviewError> {
    let env = environment()?;
    let tmpl = env.get_template(name).map_err(|e| ReviewError::Configuration {
        message: format!("failed to retrieve prompt template: {e}"),
    })?;
    tmpl.render(ctx).map_err(|e| ReviewError::Configuration {
        message: format!("prompt rendering failed: {e}"),
    })
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ReviewError> {
    serde_json::to_string_pretty(value).map_err(|e| ReviewError::Agent {
        message: format!("failed to serialise prompt input: {e}"),
    })
}

/// Renders the system message carrying the reviewer rules and guidelines.
pub(super) fn system_prompt(instruction: &ReviewInstruction) -> Result<String, ReviewError> {
    render(
        "system",
        context! {
            comment_language => instruction.comment_language.as_str(),
            instruction_text => instruction.instruction_text.as_str(),
        },
    )
}

/// Renders the user message carrying the existing comments and the diff.
pub(super) fn user_prompt(
    change_set: &ChangeSet,
    existing_comments: &[ExistingComment],
) -> Result<String, ReviewError> {
    render(
        "user",
        context! {
            existing_comments => to_pretty_json(existing_comments)?,
            change_set => to_pretty_json(change_set)?,
        },
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{system_prompt, user_prompt};
    use crate::bitbucket::models::{CommentLocation, ExistingComment};
    use crate::review::change_set::ChangeSet;
    use crate::review::model::ReviewInstruction;

    #[rstest]
    fn system_prompt_carries_language_and_guidelines() {
        let instruction = ReviewInstruction::new("Portuguese", "Prefer `const` over `let`.");

        let prompt = system_prompt(&instruction).expect("prompt should render");

        assert!(prompt.starts_with("You are a code reviewer."));
        assert!(prompt.contains("Respond in the Portuguese language."));
        assert!(prompt.ends_with("Prefer `const` over `let`."));
    }

    #[rstest]
    fn user_prompt_embeds_comments_and_diff_as_json() {
        let change_set = ChangeSet::parse(
            "--- a/a.ts\n+++ b/a.ts\n@@ -1,1 +1,1 @@\n-let x = 1;\n+const x = 1;\n",
        )
        .expect("diff should parse");
        let existing = [ExistingComment {
            id: 4,
            text: "Use <strong> types".to_owned(),
            location: Some(CommentLocation {
                line_number: 1,
                file_path: "a.ts".to_owned(),
            }),
        }];

        let prompt = user_prompt(&change_set, &existing).expect("prompt should render");

        assert!(prompt.contains("\"text\": \"Use <strong> types\""));
        assert!(prompt.contains("\"new_path\": \"a.ts\""));
        assert!(prompt.contains("\"content\": \"const x = 1;\""));
    }

    #[rstest]
    fn user_prompt_renders_empty_inputs() {
        let prompt = user_prompt(&ChangeSet::default(), &[]).expect("prompt should render");
        assert!(prompt.contains("pull request:\n\n[]"));
        assert!(prompt.ends_with("diff:\n\n[]"));
    }
}
