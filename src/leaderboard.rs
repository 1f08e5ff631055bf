//! Weekly commit leaderboard: fetch, rank, render.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::Repository;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::types::{CommitRecord, LeaderboardEntry, TimeWindow};

const DATE_FORMAT: &str = "%b %d, %Y";

/// Pulls author names out of raw commit records.
///
/// Records without `commit.author.name` are skipped and logged.
pub fn extract_authors(records: &[Value]) -> Vec<String> {
    let mut skipped = 0usize;
    let authors = records
        .iter()
        .filter_map(|raw| {
            let parsed = CommitRecord::from_value(raw);
            match parsed.author_name() {
                Ok(name) => Some(name.to_string()),
                Err(malformed) => {
                    debug!(%malformed, "skipping commit record");
                    skipped += 1;
                    None
                }
            }
        })
        .collect();
    if skipped > 0 {
        info!(skipped, "skipped commit records without author metadata");
    }
    authors
}

/// Counts commits per author, highest count first.
///
/// Equal counts keep the order in which each author first appears in
/// `authors`.
pub fn rank<S: AsRef<str>>(authors: &[S]) -> Vec<LeaderboardEntry> {
    // name -> (count, first seen index)
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, author) in authors.iter().enumerate() {
        tally.entry(author.as_ref()).or_insert((0, index)).0 += 1;
    }

    let mut ranked: Vec<_> = tally.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .map(|(author, (count, _))| LeaderboardEntry {
            author: author.to_string(),
            count,
        })
        .collect()
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn format_leaderboard(repo: &Repository, window: &TimeWindow, entries: &[LeaderboardEntry]) -> String {
    let start = format_date(window.start);
    let end = format_date(window.end);

    if entries.is_empty() {
        return format!("📊 No commits found in *{repo}* between {start} and {end}.");
    }

    let lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {} – {} commits", i + 1, entry.author, entry.count))
        .collect();
    format!(
        "🏆 Weekly Commit Champions for *{repo}*\nAs of {end} (covering {start} → {end}):\n{}",
        lines.join("\n")
    )
}

/// Fetches the window's commits and renders the leaderboard message.
pub async fn build_message(client: &GitHubClient, repo: &Repository, window: &TimeWindow) -> Result<String> {
    let records = client.commits_since(repo, window.start).await?;
    let authors = extract_authors(&records);
    let entries = rank(&authors);
    info!(%repo, commits = authors.len(), authors = entries.len(), "leaderboard computed");
    Ok(format_leaderboard(repo, window, &entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn window() -> TimeWindow {
        TimeWindow::ending_at(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
    }

    fn repo() -> Repository {
        "octo/cat".parse().unwrap()
    }

    fn commit(name: &str) -> Value {
        json!({ "sha": "x", "commit": { "author": { "name": name, "date": "2024-03-10T10:00:00Z" } } })
    }

    #[test]
    fn test_rank_orders_by_count() {
        let ranked = rank(&["bob", "bob", "ann"]);
        assert_eq!(
            ranked,
            vec![
                LeaderboardEntry { author: "bob".to_string(), count: 2 },
                LeaderboardEntry { author: "ann".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_rank_ties_follow_first_appearance() {
        let ranked = rank(&["zed", "amy", "kim", "amy", "zed", "kim"]);
        let names: Vec<_> = ranked.iter().map(|e| e.author.as_str()).collect();
        assert_eq!(names, ["zed", "amy", "kim"]);
    }

    #[test]
    fn test_rank_counts_sum_and_are_non_increasing() {
        let authors = ["a", "b", "c", "a", "b", "a", "d", "c", "a", "e", "b"];
        let ranked = rank(&authors);
        assert_eq!(ranked.iter().map(|e| e.count).sum::<usize>(), authors.len());
        assert!(ranked.windows(2).all(|pair| pair[0].count >= pair[1].count));
        assert!(ranked.iter().all(|e| e.count >= 1));
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_extract_authors_skips_malformed() {
        let records = vec![
            commit("bob"),
            json!({ "sha": "y" }),
            json!({ "sha": "z", "commit": { "author": null } }),
            json!({ "commit": { "author": { "name": 42 } } }),
            json!("not an object"),
            commit("ann"),
        ];
        assert_eq!(extract_authors(&records), ["bob", "ann"]);
    }

    #[test]
    fn test_format_no_commits() {
        let text = format_leaderboard(&repo(), &window(), &[]);
        assert_eq!(text, "📊 No commits found in *octo/cat* between Mar 08, 2024 and Mar 15, 2024.");
    }

    #[test]
    fn test_format_ranked_list() {
        let entries = rank(&["bob", "bob", "ann"]);
        let text = format_leaderboard(&repo(), &window(), &entries);
        assert_eq!(
            text,
            "🏆 Weekly Commit Champions for *octo/cat*\n\
             As of Mar 15, 2024 (covering Mar 08, 2024 → Mar 15, 2024):\n\
             1. bob – 2 commits\n\
             2. ann – 1 commits"
        );
    }

    #[test]
    fn test_format_is_deterministic() {
        let records: Vec<Value> = ["ann", "bob", "cy", "bob", "ann"].iter().map(|n| commit(n)).collect();
        let first = format_leaderboard(&repo(), &window(), &rank(&extract_authors(&records)));
        let second = format_leaderboard(&repo(), &window(), &rank(&extract_authors(&records)));
        assert_eq!(first, second);
    }
}
