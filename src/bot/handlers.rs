use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, WebAppInfo};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use crate::database::store::EventStore;

type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
type HandlerResult = Result<(), HandlerError>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Time Manager commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Register and open your countdown list")]
    Start,
}

pub struct BotHandler {
    pub store: EventStore,
    pub webapp_url_base: Option<String>,
}

impl BotHandler {
    pub fn new(store: EventStore, webapp_url_base: Option<String>) -> Self {
        Self {
            store,
            webapp_url_base,
        }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let store = self.store.clone();
        let webapp_url_base = self.webapp_url_base.clone();

        Update::filter_message()
            .filter_command::<Command>()
            .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                let store = store.clone();
                let webapp_url_base = webapp_url_base.clone();
                async move { command_handler(bot, msg, cmd, store, webapp_url_base).await }
            })
    }
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    store: EventStore,
    webapp_url_base: Option<String>,
) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            handle_start(bot, msg, store, webapp_url_base).await?;
        }
    }
    Ok(())
}

/// The first interaction: registers the user record (lazily, once) and
/// hands out the web-app button that opens their countdown list.
async fn handle_start(
    bot: Bot,
    msg: Message,
    store: EventStore,
    webapp_url_base: Option<String>,
) -> HandlerResult {
    let user_id = msg
        .from()
        .map(|user| user.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.to_string());

    match store.get_or_create_user(&user_id).await {
        Ok(upsert) => {
            if upsert.was_created() {
                info!(%user_id, "user registered");
            }
        }
        Err(reason) => {
            error!(%user_id, %reason, "user registration failed");
            bot.send_message(msg.chat.id, "Something went wrong, please try again later.")
                .await?;
            return Ok(());
        }
    }

    let mut keyboard = None;
    if let Some(base) = &webapp_url_base {
        match format!("{base}/webapp/{user_id}").parse() {
            Ok(url) => {
                let button = KeyboardButton::new("📱 Open App")
                    .request(ButtonRequest::WebApp(WebAppInfo { url }));
                keyboard = Some(KeyboardMarkup::new([[button]]).resize_keyboard(true));
            }
            Err(_) => warn!(%base, "web app base url does not parse"),
        }
    }

    let greeting = match msg.from().map(|user| user.first_name.clone()) {
        Some(name) => format!("👋 Hello {name}!\n\nTap Open App below to track your countdowns."),
        None => "👋 Hello!\n\nTap Open App below to track your countdowns.".to_string(),
    };

    let mut request = bot.send_message(msg.chat.id, greeting);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;

    Ok(())
}
