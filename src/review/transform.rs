//! Conversion of agent output into the publish format.

use crate::bitbucket::models::{CommentLocation, PublishableComment};

use super::model::ProposedComment;

impl From<ProposedComment> for PublishableComment {
    fn from(proposed: ProposedComment) -> Self {
        Self {
            text: proposed.comment,
            location: CommentLocation {
                line_number: proposed.comment_line,
                file_path: proposed.filepath,
            },
        }
    }
}

/// Maps every proposed comment 1:1 onto a publishable comment.
///
/// An absent agent result means there is nothing to add.
#[must_use]
pub fn to_publishable(proposed: Option<Vec<ProposedComment>>) -> Vec<PublishableComment> {
    proposed
        .unwrap_or_default()
        .into_iter()
        .map(PublishableComment::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::to_publishable;
    use crate::bitbucket::models::{CommentLocation, PublishableComment};
    use crate::review::model::ProposedComment;

    fn proposed(line: u64, path: &str, text: &str) -> ProposedComment {
        ProposedComment {
            comment_line: line,
            filepath: path.to_owned(),
            comment: text.to_owned(),
        }
    }

    #[rstest]
    fn renames_fields() {
        let publishable = to_publishable(Some(vec![proposed(10, "a.ts", "x")]));

        assert_eq!(
            publishable,
            [PublishableComment {
                text: "x".to_owned(),
                location: CommentLocation {
                    line_number: 10,
                    file_path: "a.ts".to_owned(),
                },
            }]
        );
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(Vec::new()))]
    fn absent_or_empty_result_yields_nothing(#[case] input: Option<Vec<ProposedComment>>) {
        assert!(to_publishable(input).is_empty());
    }

    #[rstest]
    fn keeps_agent_order_and_duplicates() {
        let publishable = to_publishable(Some(vec![
            proposed(3, "b.rs", "second"),
            proposed(1, "a.rs", "first"),
            proposed(1, "a.rs", "first"),
        ]));

        let texts: Vec<_> = publishable.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["second", "first", "first"]);
    }
}
