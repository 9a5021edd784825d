// pdf.rs
// Settlement receipts compiled to PDF by the external typst binary.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use rand::{Rng, distr::Alphanumeric};
use tokio::{fs, process::Command};

use crate::settlement::{Settlement, format_brl, format_rate};

/// Quoted typst string literal.
fn typst_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Typst source of a settlement receipt. Every dynamic value goes through a string
/// literal so user data is never parsed as markup.
pub fn settlement_source(salon: &str, provider_name: &str, settlement: &Settlement) -> String {
    let period = format!(
        "{} a {}",
        settlement.period_start.format("%d/%m/%Y"),
        settlement.period_end.format("%d/%m/%Y")
    );
    let mut src = String::new();
    src.push_str("#set page(paper: \"a4\", margin: 2cm)\n");
    src.push_str("#set text(size: 10pt)\n\n");
    src.push_str(&format!(
        "#align(center, text(size: 16pt, weight: \"bold\", {}))\n",
        typst_str(salon)
    ));
    src.push_str(&format!(
        "#align(center, {})\n\n",
        typst_str(&format!("Fechamento de comissão · {provider_name} · {period}"))
    ));

    src.push_str("#table(\n  columns: (auto, auto, 1fr, 1fr, auto, auto, auto),\n");
    src.push_str(
        "  [*Data*], [*Hora*], [*Serviço*], [*Cliente*], [*Valor*], [*%*], [*Comissão*],\n",
    );
    for line in &settlement.lines {
        src.push_str(&format!(
            "  {}, {}, {}, {}, {}, {}, {},\n",
            typst_str(&line.date.format("%d/%m/%Y").to_string()),
            typst_str(&line.time),
            typst_str(&line.service_name),
            typst_str(&line.client_name),
            typst_str(&format_brl(line.base_value)),
            typst_str(&format_rate(line.rate)),
            typst_str(&format_brl(line.payout)),
        ));
    }
    src.push_str(")\n\n");

    src.push_str(&format!(
        "#align(right, {})\n",
        typst_str(&format!("Atendimentos: {}", settlement.count))
    ));
    src.push_str(&format!(
        "#align(right, {})\n",
        typst_str(&format!("Produção: {}", format_brl(settlement.revenue)))
    ));
    src.push_str(&format!(
        "#align(right, text(weight: \"bold\", {}))\n",
        typst_str(&format!(
            "Comissão ({}): {}",
            format_rate(settlement.effective_rate),
            format_brl(settlement.payout)
        ))
    ));
    src
}

/// Runs `typst compile` in a scratch directory and returns the PDF bytes.
pub async fn compile_typst(typst_bin: &str, source: &str) -> Result<Vec<u8>> {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    let tmp_dir = std::env::temp_dir().join(format!("typst-{suffix}"));
    fs::create_dir(&tmp_dir)
        .await
        .context("create typst scratch directory")?;

    let result = run_typst(typst_bin, &tmp_dir, source).await;
    if let Err(err) = fs::remove_dir_all(&tmp_dir).await {
        tracing::warn!(dir = %tmp_dir.display(), error = %err, "typst scratch directory left behind");
    }
    result
}

async fn run_typst(typst_bin: &str, dir: &std::path::Path, source: &str) -> Result<Vec<u8>> {
    let input_path = dir.join("input.typ");
    let output_path = dir.join("output.pdf");
    fs::write(&input_path, source)
        .await
        .context("write typst source")?;

    let output = Command::new(typst_bin)
        .arg("compile")
        .arg(&input_path)
        .arg(&output_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("typst binary `{typst_bin}` not found; install it or set TYPST_BIN")
            } else {
                anyhow::Error::new(err).context("run typst")
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.trim().is_empty() {
            bail!("typst compile failed");
        }
        bail!("typst compile failed: {}", stderr.trim());
    }

    fs::read(&output_path).await.context("read typst output")
}
