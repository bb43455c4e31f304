//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Commands for mdtrans
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate Markdown files
    Md {
        /// Input file or directory (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra instructions for the model, e.g. target language or tone
        #[arg(short, long, default_value = "")]
        query: String,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Units per request (overrides CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Run the pipeline without calling the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Default output location for `file`
///
/// A directory `docs` maps to the sibling `docs_translated`, a file `a.md`
/// to `a_translated.md`.
pub fn default_output(file: &Path) -> PathBuf {
    if file.is_dir() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "docs".to_string());
        return file.with_file_name(format!("{}_translated", name));
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let ext = file
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "md".to_string());
    file.with_file_name(format!("{}_translated.{}", stem, ext))
}

/// Handle Markdown translation command
pub async fn handle_md(
    file: PathBuf,
    output: Option<PathBuf>,
    query: String,
    recursive: bool,
    chunk_size: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    use crate::core::client::EchoTranslator;
    use crate::processors::markdown::MarkdownProcessor;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::{error, info};

    let start_time = Instant::now();
    let is_dir = file.is_dir();
    let output = output.unwrap_or_else(|| default_output(&file));

    info!("Starting Markdown translation");
    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Recursive: {}", recursive);

    let mut processor = if dry_run {
        info!("Dry run: lines are echoed back unchanged");
        MarkdownProcessor::new(Arc::new(EchoTranslator))
    } else {
        MarkdownProcessor::from_env()?
    };
    if let Some(size) = chunk_size {
        processor = processor.with_chunk_size(size);
    }

    let files: Vec<PathBuf> = if is_dir {
        let found = if recursive {
            processor.find_files_recursive(&file)?
        } else {
            processor.find_files(&file)?
        };
        // An explicit output inside the input tree must not be fed back in
        found
            .into_iter()
            .filter(|path| !path.starts_with(&output))
            .collect()
    } else {
        vec![file.clone()]
    };

    if files.is_empty() {
        anyhow::bail!("No Markdown files found");
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut processed = 0;
    let mut failed = 0;

    for file_path in files {
        pb.set_message(format!("Processing: {}", file_path.display()));

        let target = if is_dir {
            let relative = file_path.strip_prefix(&file).unwrap_or(&file_path);
            output.join(relative)
        } else {
            output.clone()
        };

        match processor.translate_file(&file_path, &target, &query).await {
            Ok(_) => {
                processed += 1;
                pb.inc(1);
            }
            Err(e) => {
                failed += 1;
                pb.set_message(format!("Failed: {} - {}", file_path.display(), e));
                error!("Error processing {}: {}", file_path.display(), e);
            }
        }
    }

    pb.finish_with_message("Completed");

    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} failed in {:?}",
        processed, failed, duration
    );

    println!("\n✅ Translation completed!");
    println!("   Processed: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle server command
pub async fn handle_server(host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_for_file() {
        assert_eq!(
            default_output(Path::new("docs/readme.md")),
            PathBuf::from("docs/readme_translated.md")
        );
        assert_eq!(
            default_output(Path::new("notes.markdown")),
            PathBuf::from("notes_translated.markdown")
        );
    }

    #[test]
    fn test_default_output_for_dir() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        assert_eq!(default_output(&docs), dir.path().join("docs_translated"));
    }

    #[tokio::test]
    async fn test_handle_md_dry_run_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("guide.md");
        let doc = "# Guide\n\n```\nx = 1\n```\n![shot](img/s.png)\n";
        std::fs::write(&input, doc).unwrap();

        handle_md(input.clone(), None, String::new(), false, Some(2), true)
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("guide_translated.md")).unwrap();
        assert_eq!(written, doc);
    }

    #[tokio::test]
    async fn test_handle_md_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("sub/b.md"), "b").unwrap();
        let out = dir.path().join("out");

        handle_md(dir.path().to_path_buf(), Some(out.clone()), String::new(), true, None, true)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(out.join("a.md")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(out.join("sub/b.md")).unwrap(), "b");
    }

    fn relative_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_handle_md_directory_rerun_is_stable() {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        std::fs::create_dir_all(docs.join("sub")).unwrap();
        std::fs::write(docs.join("a.md"), "a").unwrap();
        std::fs::write(docs.join("sub/b.md"), "b").unwrap();

        for _ in 0..2 {
            handle_md(docs.clone(), None, String::new(), true, None, true)
                .await
                .unwrap();
        }

        let expected = vec![PathBuf::from("a.md"), PathBuf::from("sub/b.md")];
        assert_eq!(relative_files(&docs), expected);
        assert_eq!(relative_files(&root.path().join("docs_translated")), expected);
    }

    #[tokio::test]
    async fn test_handle_md_skips_output_inside_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        let out = dir.path().join("out");

        for _ in 0..2 {
            handle_md(dir.path().to_path_buf(), Some(out.clone()), String::new(), true, None, true)
                .await
                .unwrap();
        }

        assert_eq!(relative_files(&out), vec![PathBuf::from("a.md")]);
    }
}
