//! Wiremock fixtures shaped like the Bitbucket Cloud REST API.

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const SOURCE_HASH: &str = "source-hash";
pub const DESTINATION_HASH: &str = "dest-hash";
pub const PAGE_SIZE: u64 = 50;

pub const TWO_FILE_DIFF: &str = "\
diff --git a/file1.ts b/file1.ts
--- a/file1.ts
+++ b/file1.ts
@@ -8,3 +8,4 @@
 const a = 1;
-const b = 2;
+const value = 2;
+const c = 3;
 export { a };
diff --git a/file2.ts b/file2.ts
--- a/file2.ts
+++ b/file2.ts
@@ -1,1 +1,1 @@
-export const x = 1;
+export const x = 2;
";

pub fn pull_request_path(pr: u64) -> String {
    format!("/repositories/w/r/pullrequests/{pr}")
}

pub fn comments_path(pr: u64) -> String {
    format!("{}/comments", pull_request_path(pr))
}

fn diff_path() -> String {
    format!("/repositories/w/r/diffs/{SOURCE_HASH}...{DESTINATION_HASH}")
}

pub async fn mount_pull_request(server: &MockServer, pr: u64) {
    Mock::given(method("GET"))
        .and(path(pull_request_path(pr)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": pr,
            "source": { "commit": { "hash": SOURCE_HASH } },
            "destination": { "commit": { "hash": DESTINATION_HASH } }
        })))
        .mount(server)
        .await;
}

pub async fn mount_diff(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(diff_path()))
        .and(query_param("binary", "false"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves `total` comments in pages of fifty, plus a trailing empty page when
/// the last page is full.
pub async fn mount_comment_pages(server: &MockServer, pr: u64, total: u64) {
    let page_count = total.div_euclid(PAGE_SIZE) + 1;
    for page in 1..=page_count {
        let start = (page - 1) * PAGE_SIZE;
        let end = total.min(start + PAGE_SIZE);
        let values: Vec<Value> = (start..end)
            .map(|index| {
                json!({
                    "id": index + 1,
                    "content": { "raw": format!("existing comment {}", index + 1) },
                    "inline": { "to": 1, "path": "file1.ts" }
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("{}/", comments_path(pr))))
            .and(query_param("page", page.to_string()))
            .and(query_param("pagelen", PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": values })))
            .mount(server)
            .await;
    }
}

pub async fn mount_comment_creation(server: &MockServer, pr: u64) {
    Mock::given(method("POST"))
        .and(path(comments_path(pr)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 987 })))
        .mount(server)
        .await;
}

/// Requests the server received for `verb` on exactly `request_path`.
pub async fn requests_to(server: &MockServer, verb: &str, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == verb && request.url.path() == request_path)
        .collect()
}
