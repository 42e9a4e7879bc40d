//! Identity wrappers for the review target and endpoint path builders.

use url::Url;

use crate::error::ReviewError;

/// Bitbucket workspace slug wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace(String);

impl Workspace {
    /// Validates that the workspace slug is a single non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidIdentity`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, ReviewError> {
        validate_segment("workspace", value).map(Self)
    }

    /// Borrow the workspace slug.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository slug wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the repository slug is a single non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidIdentity`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, ReviewError> {
        validate_segment("repository", value).map(Self)
    }

    /// Borrow the repository slug.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Wraps a positive pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, ReviewError> {
        if value == 0 {
            return Err(ReviewError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

fn validate_segment(label: &str, value: &str) -> Result<String, ReviewError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReviewError::InvalidIdentity {
            message: format!("{label} must not be blank"),
        });
    }
    if trimmed.contains('/') {
        return Err(ReviewError::InvalidIdentity {
            message: format!("{label} must not contain '/': {trimmed}"),
        });
    }
    Ok(trimmed.to_owned())
}

/// Repository bearer credential wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingToken`] when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ReviewError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReviewError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("AccessToken(***)")
    }
}

/// Identifies the pull request under review.
///
/// Immutable for the duration of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestIdentity {
    workspace: Workspace,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestIdentity {
    /// Builds an identity from validated components.
    #[must_use]
    pub const fn new(
        workspace: Workspace,
        repository: RepositoryName,
        number: PullRequestNumber,
    ) -> Self {
        Self {
            workspace,
            repository,
            number,
        }
    }

    /// Builds an identity from raw workspace, repository, and number values.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidIdentity`] for blank slugs and
    /// [`ReviewError::InvalidPullRequestNumber`] for zero.
    pub fn from_parts(workspace: &str, repository: &str, number: u64) -> Result<Self, ReviewError> {
        Ok(Self::new(
            Workspace::new(workspace)?,
            RepositoryName::new(repository)?,
            PullRequestNumber::new(number)?,
        ))
    }

    /// Parses a Bitbucket pull request URL in the form
    /// `https://bitbucket.org/<workspace>/<repo>/pull-requests/<number>`.
    ///
    /// Trailing segments such as `/diff` or `/overview` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidUrl` when parsing fails, `MissingPathSegments`
    /// when the path does not contain `/workspace/repo/pull-requests/<number>`,
    /// and `InvalidPullRequestNumber` when the number is not a positive integer.
    pub fn parse_url(input: &str) -> Result<Self, ReviewError> {
        let parsed =
            Url::parse(input).map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or(ReviewError::MissingPathSegments)?;

        let workspace_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let repository_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let marker = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let number_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;

        if marker != "pull-requests" || number_segment.is_empty() {
            return Err(ReviewError::MissingPathSegments);
        }
        if workspace_segment.is_empty() || repository_segment.is_empty() {
            return Err(ReviewError::MissingPathSegments);
        }

        let number = number_segment
            .parse::<u64>()
            .map_err(|_| ReviewError::InvalidPullRequestNumber)
            .and_then(PullRequestNumber::new)?;

        Ok(Self::new(
            Workspace::new(workspace_segment)?,
            RepositoryName::new(repository_segment)?,
            number,
        ))
    }

    /// Workspace slug.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Repository slug.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// Path of the repository namespace, relative to the API base.
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!(
            "repositories/{}/{}",
            self.workspace.as_str(),
            self.repository.as_str()
        )
    }

    /// Path of the pull request resource.
    #[must_use]
    pub fn pull_request_path(&self) -> String {
        format!(
            "{}/pullrequests/{}",
            self.repository_path(),
            self.number.get()
        )
    }

    /// Path of the pull request comments collection.
    #[must_use]
    pub fn comments_path(&self) -> String {
        format!("{}/comments", self.pull_request_path())
    }

    /// Path of the diff between two commits in this repository.
    #[must_use]
    pub fn diff_path(&self, source_hash: &str, destination_hash: &str) -> String {
        format!(
            "{}/diffs/{source_hash}...{destination_hash}",
            self.repository_path()
        )
    }
}

impl std::fmt::Display for PullRequestIdentity {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}/{}#{}",
            self.workspace.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }
}
