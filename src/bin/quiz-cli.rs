use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "quiz-cli")]
#[command(about = "Command-line client for the quiz service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a quiz from a question category
    Create {
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        num_questions: u32,
        #[arg(short, long)]
        title: String,
    },
    /// Show the questions of a quiz
    Questions {
        id: String,
    },
    /// Submit answers as question=answer pairs
    Submit {
        id: String,
        #[arg(required = true)]
        answers: Vec<String>,
    },
    /// Inspect the question service circuit breaker
    Circuit,
    /// Check service liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Create { category, num_questions, title } => {
            let res = client
                .post(format!("{}/quiz/create", base))
                .json(&json!({
                    "categoryName": category,
                    "numQuestions": num_questions,
                    "title": title,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Questions { id } => {
            let res = client.get(format!("{}/quiz/get/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::Submit { id, answers } => {
            let responses = parse_answers(&answers)?;
            let res = client
                .post(format!("{}/quiz/submit/{}", base, id))
                .json(&responses)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Circuit => {
            let res = client.get(format!("{}/admin/circuit", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn parse_answers(answers: &[String]) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    answers
        .iter()
        .map(|pair| -> Result<Value, Box<dyn std::error::Error>> {
            let (id, response) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected question=answer, got '{}'", pair))?;
            Ok(json!({ "id": id, "response": response }))
        })
        .collect()
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: quiz service returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
