use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, post, web};
use clap::Parser;
use log::{info, warn};
use markov_bot_core::Error;
use markov_bot_core::analyzer::{Analyzer, MecabAnalyzer, WhitespaceAnalyzer};
use markov_bot_core::blog::{BlogClient, RecordableClient};
use markov_bot_core::config::BotConfig;
use markov_bot_core::handler::{self, PostOptions};
use markov_bot_core::store::{FileStore, PersistentStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "markov-bot-server")]
#[command(about = "Serves generation and the build / post cycle over HTTP", long_about = None)]
struct Args {
	/// Load configuration from FILE, JSON or YAML (stdio in and out when omitted)
	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Load or save the model at FILE
	#[arg(long, value_name = "FILE")]
	model_file: PathBuf,

	/// Address to listen on
	#[arg(long, default_value = "127.0.0.1:5000")]
	bind: String,

	/// Tokenize posts on whitespace instead of MeCab
	#[arg(long)]
	whitespace: bool,
}

/// Query parameters of `/v1/generate`.
#[derive(Deserialize)]
struct GenerateParams {
	min_words: Option<usize>,
	seed: Option<u64>,
}

/// Query parameters of `/v1/run`.
#[derive(Deserialize)]
struct RunParams {
	/// Records the post instead of publishing it.
	dry_run: Option<bool>,
}

#[derive(Serialize)]
struct ModelInfo {
	order: usize,
	node_count: usize,
	trained: bool,
}

struct SharedData {
	config: BotConfig,
	store: FileStore,
	analyzer: Box<dyn Analyzer + Send>,
	rng: StdRng,
}

/// Maps a bot error to its HTTP response.
///
/// # Notes
/// - A chain that never yields a long enough sequence is reported as 404,
///   the model has nothing to say.
/// - Anything else is a server side failure.
fn error_response(err: &Error) -> HttpResponse {
	match err {
		Error::GenerationExhausted { .. } => HttpResponse::NotFound().body(err.to_string()),
		_ => {
			warn!("{err}");
			HttpResponse::InternalServerError().body(err.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a text from the stored model without publishing it.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let mut chain = match handler::load_chain(&shared_data.store) {
		Ok(chain) => chain,
		Err(e) => return error_response(&e),
	};

	let mut options = PostOptions::from(&shared_data.config.chain);
	if let Some(min_words) = query.min_words {
		options.min_words_count = min_words;
	}

	let result = match query.seed {
		Some(seed) => handler::generate_text(&mut chain, &mut StdRng::seed_from_u64(seed), &options),
		None => handler::generate_text(&mut chain, &mut shared_data.rng, &options),
	};
	match result {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(&e),
	}
}

/// HTTP POST endpoint `/v1/run`
///
/// Builds the model when missing or expired, then generates and publishes a
/// post. Returns the text that was published.
#[post("/v1/run")]
async fn post_run(data: web::Data<Mutex<SharedData>>, query: web::Query<RunParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let SharedData { config, store, analyzer, rng } = &mut *shared_data;

	let mut fetch_client = config.input.client();
	let mut post_client: Box<dyn BlogClient> = if query.dry_run.unwrap_or(false) {
		Box::new(RecordableClient::default())
	} else {
		config.output.client()
	};

	let result = handler::run(
		&config.chain,
		fetch_client.as_mut(),
		post_client.as_mut(),
		analyzer.as_ref(),
		store,
		rng,
		SystemTime::now(),
	);
	match result {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/model`
///
/// Describes the stored model, 404 if none was built yet.
#[get("/v1/model")]
async fn get_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.store.mod_time() {
		Ok(None) => return HttpResponse::NotFound().body("No model built yet"),
		Ok(Some(_)) => (),
		Err(e) => return error_response(&e),
	}

	match handler::load_chain(&shared_data.store) {
		Ok(chain) => HttpResponse::Ok().json(ModelInfo {
			order: chain.order(),
			node_count: chain.node_count(),
			trained: chain.is_trained(),
		}),
		Err(e) => error_response(&e),
	}
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(post_run).service(get_model);
}

/// Main entry point for the server.
///
/// Reads the configuration, wraps the bot state in a `Mutex` and starts an
/// Actix-web HTTP server.
///
/// # Notes
/// - The model is read from `--model-file` on every request, so a model built
///   by the command line tool is picked up without a restart.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => BotConfig::from_file(path).map_err(std::io::Error::other)?,
		None => BotConfig::default(),
	};
	let analyzer: Box<dyn Analyzer + Send> = if args.whitespace {
		Box::new(WhitespaceAnalyzer)
	} else {
		Box::new(MecabAnalyzer::default())
	};

	let shared_data = SharedData {
		config,
		store: FileStore::new(&args.model_file),
		analyzer,
		rng: StdRng::from_os_rng(),
	};
	let shared_data = web::Data::new(Mutex::new(shared_data));

	info!("listening on {}", args.bind);
	HttpServer::new(move || App::new().app_data(shared_data.clone()).configure(routes))
		.bind(&args.bind)?
		.run()
		.await
}
