// quiz-vocacional - 法律系キャリア診断クイズのCLI

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::{debug, info};
use simple_logger::SimpleLogger;
use std::io;
use std::path::Path;
use std::process;
use tokio::fs;

use quiz_vocacional::careers::CategoryRegistry;
use quiz_vocacional::config::{Args, Command};
use quiz_vocacional::dashboard;
use quiz_vocacional::error::QuizResult;
use quiz_vocacional::llm::{EnrichmentProvider, LlmEnricher, StaticDescriptions};
use quiz_vocacional::questions::QuestionBank;
use quiz_vocacional::quiz::{self, Outcome, QuizApp};
use quiz_vocacional::scorer::AnswerSet;
use quiz_vocacional::store::ResultStore;

const WELCOME: &str = "Bem-vindo(a)! Este quiz tem como objetivo ajudar estudantes e profissionais de Direito \
a identificarem quais carreiras jurídicas mais combinam com seu perfil.";

// メイン関数
#[tokio::main]
async fn main() -> Result<()> {
    // .envファイルを読み込み
    dotenv().ok();

    // コマンドライン引数を解析
    let args = Args::parse();

    // ロガー初期化
    SimpleLogger::new().with_level(args.log_level).init()?;

    let registry = CategoryRegistry::legal_careers();
    let store = ResultStore::new(&args.results);

    // ダッシュボードは設問ファイルなしで動く
    if let Command::Dashboard { raw } = &args.command {
        return show_dashboard(&store, &registry, *raw);
    }

    let bank = QuestionBank::load(&args.questions, &registry)
        .with_context(|| format!("設問ファイル {} の読み込みに失敗", args.questions.display()))?;
    info!("📚 設問数: {} ({})", bank.len(), args.questions.display());

    if args.no_enrich {
        run(args, QuizApp::new(registry, bank, store, StaticDescriptions)).await
    } else {
        let enricher = LlmEnricher::from_config(&args.enrichment)?;
        debug!("🤖 生成バックエンド数: {}", enricher.backends().len());
        run(args, QuizApp::new(registry, bank, store, enricher)).await
    }
}

async fn run<P: EnrichmentProvider>(args: Args, app: QuizApp<P>) -> Result<()> {
    match args.command {
        Command::Quiz { name, report } => {
            println!("⚖️ Quiz Vocacional Jurídico\n\n{}", WELCOME);
            let answers = {
                let mut input = io::stdin().lock();
                let mut output = io::stdout();
                user_input(app.collect_answers(&mut input, &mut output))?
            };
            let outcome = user_input(app.submit(&name, &answers).await)?;
            finish(&app, &outcome, report.as_deref()).await
        }
        Command::Submit {
            answers,
            name,
            report,
        } => {
            let selections = answers.iter().map(|(id, key)| (id.as_str(), key.as_str()));
            let answers = user_input(AnswerSet::from_selections(app.bank(), selections))?;
            let outcome = user_input(app.submit(&name, &answers).await)?;
            finish(&app, &outcome, report.as_deref()).await
        }
        Command::Questions => {
            for question in app.bank().questions() {
                println!("\n{}. {}", question.id, question.prompt);
                for (key, option) in &question.options {
                    println!(
                        "   {}) {}  [{}]",
                        key,
                        option.text,
                        app.registry().display_name(&option.category_code)
                    );
                }
            }
            Ok(())
        }
        Command::Dashboard { raw } => show_dashboard(app.store(), app.registry(), raw),
    }
}

// 入力の誤りはメッセージだけ表示して終了コード2、それ以外はそのまま伝播
fn user_input<T>(result: QuizResult<T>) -> Result<T> {
    match result {
        Err(e) if e.is_user_facing() => {
            eprintln!("{}", e);
            process::exit(2);
        }
        other => Ok(other?),
    }
}

async fn finish<P: EnrichmentProvider>(
    app: &QuizApp<P>,
    outcome: &Outcome,
    report_path: Option<&Path>,
) -> Result<()> {
    print!("{}", quiz::render_outcome(outcome, app.registry()));

    if let Some(path) = report_path {
        fs::write(path, &outcome.report)
            .await
            .with_context(|| format!("レポート {} の保存に失敗", path.display()))?;
        info!("📄 レポート保存: {}", path.display());
        println!("Relatório salvo em {}", path.display());
    }
    Ok(())
}

fn show_dashboard(store: &ResultStore, registry: &CategoryRegistry, raw: bool) -> Result<()> {
    let records = store
        .load_all()
        .with_context(|| format!("結果ファイル {} の読み込みに失敗", store.path().display()))?;
    let summary = dashboard::aggregate(&records, registry);

    println!("📊 Estatísticas gerais do Quiz\n");
    print!("{}", dashboard::render(&summary, registry));

    if raw && !records.is_empty() {
        println!("\nDados brutos:");
        print!("{}", dashboard::render_raw(&records));
    }
    Ok(())
}
