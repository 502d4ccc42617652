use bullpen::application_port::*;
use bullpen::community::*;
use bullpen::domain_model::*;
use bullpen::logger::*;
use bullpen::settings::*;
use futures_util::StreamExt;

// $ cargo run --bin community_demo -- --settings=settings/dev.toml
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig {
        filter: project_settings.log.filter.clone(),
    })?;

    let community = Community::try_new(&project_settings).await?;

    let alice = MemberProfile::new("u1").with_username("alice");
    let bob = MemberProfile::new("u2").with_username("bob");

    let group_id = community
        .group_registry
        .create(CreateGroupInput {
            owner: alice.clone(),
            name: "Alpha".to_string(),
            description: "small caps only".to_string(),
            group_type: GroupType::Private,
            password: Some("secret123".to_string()),
        })
        .await?;
    let group = community
        .group_registry
        .get_by_id(&group_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("group vanished"))?;
    info!(%group_id, code = %group.invite_code, "created");

    let wrong = community
        .membership_manager
        .join_by_invite_code(group.invite_code.as_str(), &bob, Some("wrong"))
        .await;
    info!(?wrong, "join with wrong password");

    community
        .membership_manager
        .join_by_invite_code(group.invite_code.as_str(), &bob, Some("secret123"))
        .await?;

    let message_id = community
        .message_stream
        .send(
            &group_id,
            OutgoingMessage {
                author: MessageAuthor::new("u2", "bob"),
                content: MessageContent::text("long $ABC into earnings"),
            },
        )
        .await?;
    community
        .message_stream
        .pin(&group_id, &message_id, &alice.uid, true)
        .await?;

    let mut view = community
        .message_stream
        .list(&group_id, community.default_page_size)
        .await?;
    if let Some(snapshot) = view.next().await {
        for message in snapshot {
            info!(
                pinned = message.is_pinned,
                author = %message.author.name,
                "{}",
                message.content.preview()
            );
        }
    }
    view.cancel();

    community.social_graph.follow(&bob.uid, &alice.uid).await?;
    let stats = community.social_graph.stats(&alice.uid).await?;
    info!(?stats, "alice");

    community.shutdown().await;
    Ok(())
}
