use anyhow::Context as _;
use dmcast::adapters::serenity_welcome;
use dmcast::adapters::{SerenityDeliveryTransport, SerenityMemberProvider, SerenityProgressSink};
use dmcast::broadcast::source::BroadcastSource;
use dmcast::broadcast::trigger_filter::TriggerFilter;
use dmcast::broadcast::{
    BatchCoordinator, ChannelRegistry, GuardRegistry, ShutdownSignal, shutdown_channel,
};
use dmcast::params;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::prelude::*;

type Coordinator = BatchCoordinator<SerenityDeliveryTransport, SerenityMemberProvider>;

struct Handler {
    params: Arc<params::Params>,
    trigger_filter: TriggerFilter,
    guard: GuardRegistry,
    shutdown: ShutdownSignal,
    // Coordinator needs the client's HTTP client and cache, built on first message
    coordinator: OnceLock<Arc<Coordinator>>,
}

impl Handler {
    fn new(params: &params::Params, shutdown: ShutdownSignal) -> Handler {
        let channels = ChannelRegistry::new(params.broadcast_channels.iter().copied());

        Handler {
            params: Arc::new(params.clone()),
            trigger_filter: TriggerFilter::new(channels, params.command_prefix.clone()),
            guard: GuardRegistry::new(params.rate_limiter()),
            shutdown,
            coordinator: OnceLock::new(),
        }
    }

    fn coordinator(&self, ctx: &Context) -> Arc<Coordinator> {
        self.coordinator
            .get_or_init(|| {
                let transport = Arc::new(SerenityDeliveryTransport::new(ctx.http.clone()));
                let members = Arc::new(SerenityMemberProvider::new(
                    ctx.cache.clone(),
                    ctx.http.clone(),
                    self.params.refresh_members,
                ));
                Arc::new(BatchCoordinator::new(
                    transport,
                    members,
                    self.guard.clone(),
                    self.params.broadcast_policy(),
                ))
            })
            .clone()
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!(
            display_name = %ready.user.display_name(),
            user_id = %ready.user.id,
            guilds = ready.guilds.len(),
            broadcast_channels = self.trigger_filter.channels().len(),
            "Bot is connected"
        );
        info!(
            install_url = %format!("https://discord.com/oauth2/authorize?client_id={}&scope=bot", ready.application.id),
            "Bot install URL available"
        );

        if self.trigger_filter.channels().is_empty() {
            warn!("No broadcast channels configured (set BROADCAST_CHANNELS)");
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        if is_new != Some(true) {
            return;
        }
        info!(guild_id = %guild.id, guild_name = %guild.name, "Joined new guild");

        let bot_id = ctx.cache.current_user().id;
        // Welcome is best effort; failure never affects the bot
        if let Err(err) = serenity_welcome::send_welcome(&ctx.http, &guild, bot_id).await {
            warn!(guild_id = %guild.id, ?err, "Failed to send welcome message");
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        if !self.trigger_filter.should_broadcast(&message) {
            return;
        }

        let guild_name = message
            .guild_id
            .and_then(|guild_id| ctx.cache.guild(guild_id).map(|guild| guild.name.clone()))
            .unwrap_or_else(|| "this server".to_string());

        let Some(source) = BroadcastSource::from_message(&message, guild_name) else {
            return;
        };

        info!(
            source = %source.key,
            author = %message.author.name,
            "Broadcast triggered"
        );

        let coordinator = self.coordinator(&ctx);
        let sink = SerenityProgressSink::new(ctx.http.clone(), message.channel_id, message.id);
        let shutdown = self.shutdown.clone();

        // One task per broadcast so the gateway loop keeps receiving events
        tokio::spawn(async move {
            let report = coordinator.run(&source, &sink, &shutdown).await;
            debug!(source = %source.key, ?report, "Broadcast task finished");
        });
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Default: dmcast=info, serenity=warn (suppress serenity's normal operation logs)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dmcast=info,serenity=warn".into()),
        )
        .init();

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
        "Starting application"
    );

    let params = params::Params::new()?;
    info!(?params, "Application parameters loaded");

    // Members intent is privileged and required for complete member snapshots
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    info!(?intents, "Gateway intents configured");

    let (shutdown_trigger, shutdown) = shutdown_channel();

    let mut client = Client::builder(&params.discord_token, intents)
        .event_handler(Handler::new(&params, shutdown))
        .await
        .context("Creating Discord Client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(?err, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown requested, stopping running broadcasts");
        shutdown_trigger.trigger();
        shard_manager.shutdown_all().await;
    });

    client
        .start_autosharded()
        .await
        .context("Running Discord Client")
}
