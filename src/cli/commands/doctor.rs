//! Doctor command - verify configuration and connectivity.

use crate::cli::{format_file_size, Output};
use crate::config::Settings;
use crate::db;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::llm::{ChatModel, CompletionRequest, OpenAIChat};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks. Fails if any check errors.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("travel-rag Doctor");
    println!();
    println!("Checking configuration and connectivity...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let key_check = check_api_key(settings);
    let has_key = key_check.status != CheckStatus::Error;
    let mut section = vec![key_check, check_base_url(settings)];
    if has_key {
        section.push(check_llm(settings).await);
        section.push(check_embedding(settings).await);
    }
    print_all(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Storage").bold());
    let section = vec![check_postgres(settings).await, check_working_dir(settings)];
    print_all(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("{} doctor check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! travel-rag is ready to use.");
    }

    Ok(())
}

fn print_all(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Mask all but the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_api_key(settings: &Settings) -> CheckResult {
    match settings.llm.require_api_key() {
        Ok(key) => CheckResult::ok("QWEN_API_KEY", &format!("configured ({})", mask_key(key))),
        Err(_) => CheckResult::error(
            "QWEN_API_KEY",
            "not set",
            "Add QWEN_API_KEY=... to .env or export it",
        ),
    }
}

fn check_base_url(settings: &Settings) -> CheckResult {
    let url = &settings.llm.base_url;
    if url.starts_with("https://") || url.starts_with("http://") {
        CheckResult::ok("QWEN_BASE_URL", url)
    } else {
        CheckResult::warning(
            "QWEN_BASE_URL",
            &format!("{} (not an http(s) URL)", url),
            "Expected e.g. https://dashscope.aliyuncs.com/compatible-mode/v1",
        )
    }
}

async fn check_llm(settings: &Settings) -> CheckResult {
    let name = format!("LLM ({})", settings.llm.model);
    let chat = match OpenAIChat::new(&settings.llm) {
        Ok(chat) => chat,
        Err(e) => return CheckResult::error(&name, &e.to_string(), "Check the LLM settings"),
    };

    let request = CompletionRequest::new("Reply with one short sentence confirming you are online.")
        .with_max_tokens(50);
    match chat.try_complete(&request).await {
        Ok(reply) => {
            let preview: String = reply.trim().chars().take(60).collect();
            CheckResult::ok(&name, &format!("responded: {}", preview))
        }
        Err(e) => CheckResult::error(&name, &e.to_string(), "Check QWEN_API_KEY and QWEN_BASE_URL"),
    }
}

async fn check_embedding(settings: &Settings) -> CheckResult {
    let name = format!("Embedding ({})", settings.embedding.model);
    let embedder = match OpenAIEmbedder::new(&settings.llm, &settings.embedding) {
        Ok(embedder) => embedder,
        Err(e) => return CheckResult::error(&name, &e.to_string(), "Check the embedding settings"),
    };

    match embedder.embed("Clearwater Beach, Florida").await {
        Ok(vector) if vector.len() == embedder.dimensions() => {
            let head: Vec<String> = vector.iter().take(5).map(|v| format!("{:.4}", v)).collect();
            CheckResult::ok(
                &name,
                &format!("{} dims, first values [{}]", vector.len(), head.join(", ")),
            )
        }
        Ok(vector) => CheckResult::warning(
            &name,
            &format!("{} dims, expected {}", vector.len(), embedder.dimensions()),
            "Set embedding.dimensions to what the model returns",
        ),
        Err(e) => CheckResult::error(&name, &e.to_string(), "Check QWEN_API_KEY and QWEN_BASE_URL"),
    }
}

async fn check_postgres(settings: &Settings) -> CheckResult {
    let pg = &settings.postgres;
    let name = "PostgreSQL";
    let target = format!("{}@{}:{}/{}", pg.user, pg.host, pg.port, pg.database);

    let pool = match db::connect(pg, 1).await {
        Ok(pool) => pool,
        Err(e) => {
            return CheckResult::error(
                name,
                &format!("{} unreachable: {}", target, e),
                "Check POSTGRES_HOST, POSTGRES_PORT, POSTGRES_USER, POSTGRES_PASSWORD and POSTGRES_DB",
            )
        }
    };

    let result = match db::ping(&pool).await {
        Ok(()) => CheckResult::ok(name, &format!("{} (workspace {})", target, pg.workspace)),
        Err(e) => CheckResult::error(name, &format!("{}: {}", target, e), "Check database permissions"),
    };
    pool.close().await;
    result
}

fn check_working_dir(settings: &Settings) -> CheckResult {
    let dir = settings.working_dir();
    let vectors = dir.join("vectors.db");
    if vectors.exists() {
        let size = std::fs::metadata(&vectors)
            .map(|m| format_file_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok(
            "Working directory",
            &format!("{} (local store {})", dir.display(), size),
        )
    } else if dir.exists() {
        CheckResult::ok("Working directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Working directory",
            &format!("{} (not created yet)", dir.display()),
            "Created on first import",
        )
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults and environment",
            &format!("Optional: create {}", config_path.display()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-1234567890abcdef"), "sk-123...cdef");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_missing_api_key_is_error() {
        let check = check_api_key(&Settings::default());
        assert_eq!(check.status, CheckStatus::Error);
    }

    #[test]
    fn test_base_url_check() {
        let mut settings = Settings::default();
        assert_eq!(check_base_url(&settings).status, CheckStatus::Ok);
        settings.llm.base_url = "dashscope".to_string();
        assert_eq!(check_base_url(&settings).status, CheckStatus::Warning);
    }
}
