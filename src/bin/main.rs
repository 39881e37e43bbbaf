mod util;

use clap::{Parser, Subcommand};
use coursescout::search::describe_store_error;
use coursescout::{
    CatalogFrontEnd, ChromeLauncher, Collector, CollectorConfig, CourseScoutDirs,
    ExtractionPolicy, FormServer, InMemoryCourseIndex, JsonCourseStore, LocalEmbedder,
    NO_MATCHES, SemanticFrontEnd, DEFAULT_BIND_ADDR, DEFAULT_CATALOG_LIMIT, DEFAULT_COURSES_URL,
    DEFAULT_SEMANTIC_LIMIT, DEFAULT_TOP_K,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use util::{print_courses, print_outcome};

#[derive(Parser)]
#[command(name = "coursescout")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape courses, embed them and serve a semantic search form
    Semantic {
        #[clap(long, default_value = DEFAULT_COURSES_URL, help = "Listing page to scrape.")]
        url: String,
        #[clap(long, default_value_t = DEFAULT_SEMANTIC_LIMIT, help = "Maximum number of courses to scrape.")]
        limit: usize,
        #[clap(long, default_value = DEFAULT_BIND_ADDR, help = "Address the search form listens on.")]
        bind: SocketAddr,
        #[clap(long, default_value_t = DEFAULT_TOP_K, help = "Number of matches returned per query.")]
        top: usize,
        #[clap(
            long,
            help = "Directory with model.onnx and tokenizer files to use instead of the default model."
        )]
        model_dir: Option<PathBuf>,
    },
    /// Scrape courses into the JSON store
    Scrape {
        #[clap(long, default_value = DEFAULT_COURSES_URL, help = "Listing page to scrape.")]
        url: String,
        #[clap(long, default_value_t = DEFAULT_CATALOG_LIMIT, help = "Maximum number of courses to scrape.")]
        limit: usize,
        #[clap(long, help = "Path of the JSON store (default: the project data directory).")]
        store: Option<PathBuf>,
        #[clap(long, help = "Stop at the first unreadable card instead of skipping it.")]
        strict: bool,
    },
    /// Serve a title search form over the JSON store
    Catalog {
        #[clap(long, help = "Path of the JSON store (default: the project data directory).")]
        store: Option<PathBuf>,
        #[clap(long, default_value = DEFAULT_BIND_ADDR, help = "Address the search form listens on.")]
        bind: SocketAddr,
        #[clap(long, help = "Scrape and rewrite the store before serving.")]
        scrape: bool,
        #[clap(long, default_value = DEFAULT_COURSES_URL, help = "Listing page to scrape with --scrape.")]
        url: String,
        #[clap(long, default_value_t = DEFAULT_CATALOG_LIMIT, help = "Maximum number of courses to scrape with --scrape.")]
        limit: usize,
    },
    /// Search course titles in the JSON store once and print the matches
    Search {
        /// Text to look for in course titles
        query: String,
        #[clap(long, help = "Path of the JSON store (default: the project data directory).")]
        store: Option<PathBuf>,
    },
}

fn store_at(path: Option<PathBuf>) -> JsonCourseStore {
    JsonCourseStore::new(path.unwrap_or_else(|| CourseScoutDirs::new().default_store_path()))
}

async fn scrape_into(
    store: &JsonCourseStore,
    url: &str,
    limit: usize,
    policy: ExtractionPolicy,
) -> anyhow::Result<()> {
    let config = CollectorConfig {
        policy,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(ChromeLauncher::new(), config);
    let outcome = collector.collect(url, Some(limit)).await;
    print_outcome(url, &outcome);

    store.write(outcome.records())?;
    println!("Saved {} course(s) to {}", outcome.records().len(), store.path().display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Semantic {
            url,
            limit,
            bind,
            top,
            model_dir,
        } => {
            let collector = Collector::new(ChromeLauncher::new(), CollectorConfig::default());
            let outcome = collector.collect(&url, Some(limit)).await;
            print_outcome(&url, &outcome);

            let courses = outcome.into_records();
            if courses.is_empty() {
                println!("No courses found!");
                return Ok(());
            }
            print_courses(&courses);

            let embedder = match model_dir {
                Some(dir) => LocalEmbedder::new_with_local_model(&dir, None)?,
                None => LocalEmbedder::new_with_default_model()?,
            };
            let index = InMemoryCourseIndex::build(&courses, embedder)?;
            let front_end = SemanticFrontEnd::new(index).with_top_k(top);

            FormServer::new(front_end).serve(bind).await?;
        }
        Commands::Scrape {
            url,
            limit,
            store,
            strict,
        } => {
            let policy = if strict {
                ExtractionPolicy::AbortBatch
            } else {
                ExtractionPolicy::SkipRecord
            };
            scrape_into(&store_at(store), &url, limit, policy).await?;
        }
        Commands::Catalog {
            store,
            bind,
            scrape,
            url,
            limit,
        } => {
            let store = store_at(store);
            if scrape {
                scrape_into(&store, &url, limit, ExtractionPolicy::SkipRecord).await?;
            }
            FormServer::new(CatalogFrontEnd::new(store)).serve(bind).await?;
        }
        Commands::Search { query, store } => {
            let store = store_at(store);
            match store.search_titles(&query) {
                Ok(matches) if matches.is_empty() => println!("{}", NO_MATCHES),
                Ok(matches) => {
                    println!("Found {} course(s):", matches.len());
                    println!();
                    for course in &matches {
                        println!("{}", course.title);
                        println!("   Lessons: {}", course.lessons);
                        println!("   Price: {}", course.price);
                        println!("   Image: {}", course.image_url);
                        println!();
                    }
                }
                Err(e) => println!("{}", describe_store_error(&e)),
            }
        }
    }
    Ok(())
}
