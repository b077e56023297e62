use anyhow::Result;
use eframe::egui;
use log::info;

use qa_vote_agent::config::AgentConfig;
use qa_vote_agent::gui::state::AppState;
use qa_vote_agent::gui::VoteApp;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AgentConfig::from_env()?;
    info!(
        "Using backend {} as user {} (retract mode {:?})",
        config.api_url, config.user_id, config.retract_mode
    );
    let question_id = config.question_id;

    // background requests run here while the window owns the main thread
    let runtime = tokio::runtime::Runtime::new()?;
    let mut state = AppState::new(config, runtime.handle().clone())?;
    state.load_question(question_id);

    let builder = egui::ViewportBuilder::default()
        .with_title("Q&A Votes")
        .with_inner_size(egui::vec2(720.0, 800.0));

    let options = eframe::NativeOptions {
        viewport: builder,
        ..Default::default()
    };

    eframe::run_native(
        "Q&A Votes",
        options,
        Box::new(move |_cc| Ok(Box::new(VoteApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    info!("Window closed");
    Ok(())
}
