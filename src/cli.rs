use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use curlwrap::config::{ConfigLoader, Settings};
use curlwrap::cookie::printer::render_jar;
use curlwrap::cookie::{CookieStore, FileCookieStore, MemoryCookieStore};
use curlwrap::http::CurlClient;
use curlwrap::utils::{ResponseFormat, ResponseFormatter};
use curlwrap::workflow::{Carrier, FileHostClient, PromptSolver, TrackingClient};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Proxy as host:port
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// curl binary to run
    #[arg(long, global = true)]
    pub curl: Option<String>,

    /// Timeout in seconds for non-download requests
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Config file, instead of searching for curlwrap.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep cookies in memory only
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Print plain JSON without colors
    #[arg(long, global = true)]
    pub raw: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query tracking status (fedex, ups, usps)
    Track {
        carrier: Carrier,
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Resolve the final download link of a file-host item page
    Link { url: String },
    /// Resolve the link and download the file
    Download {
        url: String,
        /// Directory to save into
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Inspect or drop cached cookies
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
}

#[derive(Subcommand)]
pub enum CookieAction {
    Show { carrier: Carrier },
    Clear { carrier: Carrier },
}

struct CliRunner {
    settings: Settings,
    formatter: ResponseFormatter,
    no_cache: bool,
}

impl CliRunner {
    fn new(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => ConfigLoader::load_from_path(path)?,
            None => ConfigLoader::find_and_load()?,
        };

        // CLI 参数优先
        if let Some(proxy) = &cli.proxy {
            settings.proxy = Some(proxy.clone());
        }
        if let Some(curl) = &cli.curl {
            settings.curl_path = curl.clone();
        }
        if let Some(timeout) = cli.timeout {
            settings.timeout_secs = timeout;
        }

        let formatter = if cli.raw {
            ResponseFormatter::new(ResponseFormat::Raw).without_color()
        } else {
            ResponseFormatter::new(ResponseFormat::Pretty)
        };

        Ok(Self {
            settings,
            formatter,
            no_cache: cli.no_cache,
        })
    }

    fn client(&self) -> CurlClient {
        CurlClient::new()
            .with_program(self.settings.curl_path.clone())
            .with_timeout(Duration::from_secs(self.settings.timeout_secs))
            .with_retries(self.settings.retries)
            .with_download_dir(self.settings.download_dir.clone())
    }

    fn file_store(&self) -> FileCookieStore {
        FileCookieStore::new(self.settings.cookie_dir.clone())
            .with_max_age(self.settings.cookie_max_age())
    }

    fn proxy(&self) -> Option<&str> {
        self.settings.proxy.as_deref()
    }

    async fn track(&self, carrier: Carrier, numbers: &[String]) -> Result<()> {
        let file_store = self.file_store();
        let memory_store = MemoryCookieStore::new();
        let store: &dyn CookieStore = if self.no_cache {
            &memory_store
        } else {
            &file_store
        };

        let mut results = Vec::new();
        for number in numbers {
            let tracker = TrackingClient::connect(carrier, self.client(), store, self.proxy()).await;
            results.push(tracker.track(number).await);
        }

        match results.as_slice() {
            [single] => println!(
                "{}",
                self.formatter
                    .format(&format!("{} {}", carrier, numbers[0]), single)
            ),
            _ => println!("{}", self.formatter.format_all(&results)),
        }
        Ok(())
    }

    fn file_host(&self) -> Result<FileHostClient<CurlClient, PromptSolver>> {
        let solver = match &self.settings.download_dir {
            Some(dir) => PromptSolver::new(dir.clone()),
            None => PromptSolver::default(),
        };
        Ok(FileHostClient::new(self.client(), solver, self.proxy())?)
    }

    async fn link(&self, url: &str) -> Result<()> {
        match self.file_host()?.final_download_link(url).await? {
            Some(link) => println!("{}", link),
            None => anyhow::bail!("Could not get final link for {}", url),
        }
        Ok(())
    }

    async fn download(&mut self, url: &str, dir: Option<PathBuf>) -> Result<()> {
        if dir.is_some() {
            self.settings.download_dir = dir;
        }
        match self.file_host()?.download_file(url).await? {
            Some(response) => println!("{}", self.formatter.format(url, &response)),
            None => anyhow::bail!("Could not get final link for {}", url),
        }
        Ok(())
    }

    fn cookies(&self, action: &CookieAction) -> Result<()> {
        let store = self.file_store();
        match action {
            CookieAction::Show { carrier } => {
                let key = carrier.profile().cache_key;
                match store.load(key)? {
                    Some(jar) => println!("{}", render_jar(key, &jar)),
                    None => println!("No fresh cookies cached for {}", carrier),
                }
            }
            CookieAction::Clear { carrier } => {
                store.clear(carrier.profile().cache_key)?;
                println!("Cleared cached cookies for {}", carrier);
            }
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut runner = CliRunner::new(&cli)?;
    match cli.command {
        Commands::Track { carrier, numbers } => runner.track(carrier, &numbers).await,
        Commands::Link { url } => runner.link(&url).await,
        Commands::Download { url, dir } => runner.download(&url, dir).await,
        Commands::Cookies { action } => runner.cookies(&action),
    }
}
