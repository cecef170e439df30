use crate::app::App;
use crate::cli::{
    Command, ForumAction, MeetArgs, OnboardAccount, PatientArgs, ProfileAction, ProfileEdit,
    ResearcherArgs, SearchKind, SummaryKind,
};
use crate::render;
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveTime};
use curalink_assistant::{AssistantReply, Conversation};
use curalink_catalog::forum::{self, AVAILABLE_CATEGORIES, NewPost};
use curalink_catalog::{SearchContext, SearchResults, render_summary, resolve_favorites};
use curalink_common::{CuralinkError, require_fields};
use curalink_events::ProductEvent;
use curalink_store::{
    FavoriteCategory, FavoritesSet, PatientProfile, Profile, ResearcherProfile,
};
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const MEETING_DURATIONS: [u32; 4] = [15, 30, 45, 60];

pub async fn run(app: &App, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Onboard { account } => onboard(app, account, out).await,
        Command::Profile { action } => match action {
            ProfileAction::Show => show_profile(app, out).await,
            ProfileAction::Edit(edit) => edit_profile(app, edit, out).await,
        },
        Command::Search { query, kind } => search(app, &query.join(" "), kind, out).await,
        Command::Favorite { category, id } => favorite(app, &category, &id, out).await,
        Command::Favorites { summary, output } => {
            favorites(app, summary, output.as_deref(), out).await
        }
        Command::Summarize { kind, id } => summarize(app, kind, &id, out).await,
        Command::Chat { message, reset } => {
            let mut convo = Conversation::load(app.session()).await?;
            if reset {
                convo.reset().await?;
            }
            if message.is_empty() {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                chat_loop(app, &mut convo, stdin, out).await
            } else {
                chat_turn(app, &mut convo, &message.join(" "), out).await
            }
        }
        Command::Meet(args) => meet(app, args, out).await,
        Command::Forum { action } => forum_cmd(app, action, out).await,
        Command::Logout => {
            app.logout().await?;
            writeln!(out, "Signed out. Profile, favorites and conversation were cleared.")?;
            Ok(())
        }
    }
}

fn profile_json(profile: &Profile) -> Result<serde_json::Value> {
    let body = match profile {
        Profile::Patient(p) => serde_json::to_value(p)?,
        Profile::Researcher(r) => serde_json::to_value(r)?,
    };
    Ok(json!({ "userType": profile.account_type(), "profile": body }))
}

async fn save_profile(app: &App, profile: Profile, out: &mut dyn Write) -> Result<()> {
    let switched = app.profiles.save(&profile).await?;
    app.profiles.ensure_user_id().await?;

    let account = profile.account_type();
    if let Some(previous) = switched {
        writeln!(out, "Switched account type from {previous} to {account}.")?;
        app.emit(ProductEvent::account_type_changed(
            previous.as_str(),
            account.as_str(),
        ))
        .await;
    }
    Ok(())
}

async fn onboard(app: &App, account: OnboardAccount, out: &mut dyn Write) -> Result<()> {
    let profile = match account {
        OnboardAccount::Patient(PatientArgs {
            name,
            disease,
            location,
            info,
        }) => Profile::Patient(PatientProfile {
            name,
            disease,
            location,
            additional_info: info,
        }),
        OnboardAccount::Researcher(ResearcherArgs {
            name,
            institution,
            specialties,
            interests,
            location,
            orcid,
        }) => Profile::Researcher(ResearcherProfile {
            name,
            institution,
            specialties,
            research_interests: interests,
            location,
            orcid,
        }),
    };

    save_profile(app, profile.clone(), out).await?;
    writeln!(
        out,
        "Welcome, {}! Your {} profile is saved on this device.",
        profile.name(),
        profile.account_type()
    )?;
    app.emit(ProductEvent::user_signup(profile_json(&profile)?)).await;
    Ok(())
}

async fn current_profile(app: &App) -> Result<Profile> {
    app.profiles.current().await?.ok_or_else(|| {
        CuralinkError::NotFound("no profile yet; run `curalink onboard` first".into()).into()
    })
}

async fn show_profile(app: &App, out: &mut dyn Write) -> Result<()> {
    let profile = current_profile(app).await?;
    writeln!(out, "{}", render::profile(&profile))?;
    Ok(())
}

fn not_for(account: &str, field: &str) -> CuralinkError {
    CuralinkError::InvalidInput(format!("--{field} does not apply to a {account} profile"))
}

fn apply_edit(profile: Profile, edit: ProfileEdit) -> Result<Profile, CuralinkError> {
    let set = |slot: &mut String, value: Option<String>| {
        if let Some(v) = value {
            *slot = v;
        }
    };
    match profile {
        Profile::Patient(mut p) => {
            for (field, value) in [
                ("institution", &edit.institution),
                ("specialties", &edit.specialties),
                ("interests", &edit.interests),
                ("orcid", &edit.orcid),
            ] {
                if value.is_some() {
                    return Err(not_for("patient", field));
                }
            }
            set(&mut p.name, edit.name);
            set(&mut p.location, edit.location);
            set(&mut p.disease, edit.disease);
            set(&mut p.additional_info, edit.info);
            Ok(Profile::Patient(p))
        }
        Profile::Researcher(mut r) => {
            for (field, value) in [("disease", &edit.disease), ("info", &edit.info)] {
                if value.is_some() {
                    return Err(not_for("researcher", field));
                }
            }
            set(&mut r.name, edit.name);
            set(&mut r.location, edit.location);
            set(&mut r.institution, edit.institution);
            set(&mut r.specialties, edit.specialties);
            set(&mut r.research_interests, edit.interests);
            set(&mut r.orcid, edit.orcid);
            Ok(Profile::Researcher(r))
        }
    }
}

async fn edit_profile(app: &App, edit: ProfileEdit, out: &mut dyn Write) -> Result<()> {
    let updated = apply_edit(current_profile(app).await?, edit)?;
    save_profile(app, updated.clone(), out).await?;
    writeln!(out, "Profile updated.")?;
    writeln!(out, "{}", render::profile(&updated))?;
    Ok(())
}

async fn search_context(app: &App) -> Result<SearchContext> {
    Ok(match app.profiles.current().await? {
        Some(p) => SearchContext::new(Some(p.interest().to_string()), Some(p.location().to_string())),
        None => SearchContext::default(),
    })
}

fn print_results(
    results: &SearchResults,
    favorites: &FavoritesSet,
    out: &mut dyn Write,
) -> Result<()> {
    if !results.researchers.is_empty() {
        writeln!(out, "Health Experts ({})", results.researchers.len())?;
        for r in &results.researchers {
            writeln!(out, "{}", render::researcher(r, favorites))?;
        }
        writeln!(out)?;
    }
    if !results.publications.is_empty() {
        writeln!(out, "Publications ({})", results.publications.len())?;
        for p in &results.publications {
            writeln!(out, "{}", render::publication(p, favorites))?;
        }
        writeln!(out)?;
    }
    if !results.trials.is_empty() {
        writeln!(out, "Clinical Trials ({})", results.trials.len())?;
        for t in &results.trials {
            writeln!(out, "{}", render::trial(t, favorites))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

async fn search(app: &App, query: &str, kind: SearchKind, out: &mut dyn Write) -> Result<()> {
    let ctx = search_context(app).await?;
    let search = app.search.as_ref();
    let results = match kind {
        SearchKind::All => search.search_all(query, &ctx).await?,
        SearchKind::Researchers => SearchResults {
            researchers: search.search_researchers(query, &ctx).await?,
            ..Default::default()
        },
        SearchKind::Publications => SearchResults {
            publications: search.search_publications(query, &ctx).await?,
            ..Default::default()
        },
        SearchKind::Trials => SearchResults {
            trials: search.search_clinical_trials(query, &ctx).await?,
            ..Default::default()
        },
    };

    if results.is_empty() {
        writeln!(out, "No results for \"{}\".", query.trim())?;
    } else {
        let favorites = app.favorites.get_favorites().await?;
        print_results(&results, &favorites, out)?;
    }
    out.flush()?;

    app.emit(ProductEvent::search_performed(kind.as_str(), query, results.len()))
        .await;
    Ok(())
}

/// Display name of a catalog entity, if it exists.
async fn entity_title(app: &App, category: FavoriteCategory, id: &str) -> Result<Option<String>> {
    let ctx = SearchContext::default();
    let search = app.search.as_ref();
    Ok(match category {
        FavoriteCategory::Researchers => search
            .search_researchers("", &ctx)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .map(|r| r.name),
        FavoriteCategory::Publications => search
            .search_publications("", &ctx)
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.title),
        FavoriteCategory::Trials => search
            .search_clinical_trials("", &ctx)
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .map(|t| t.title),
    })
}

async fn favorite(app: &App, category: &str, id: &str, out: &mut dyn Write) -> Result<()> {
    let category: FavoriteCategory = category.parse()?;
    let id = id.trim();
    let set = app.favorites.toggle_favorite(category, id).await?;
    let added = set.contains(category, id);
    let title = entity_title(app, category, id)
        .await?
        .unwrap_or_else(|| id.to_string());

    if added {
        writeln!(out, "Saved to {category}: {title}")?;
    } else {
        writeln!(out, "Removed from {category}: {title}")?;
    }
    writeln!(
        out,
        "Favorites: {} researchers, {} publications, {} trials",
        set.researchers.len(),
        set.publications.len(),
        set.trials.len()
    )?;
    out.flush()?;

    if added {
        let event = match category {
            FavoriteCategory::Researchers => ProductEvent::expert_followed(id, &title),
            FavoriteCategory::Publications => ProductEvent::publication_saved(id, &title),
            FavoriteCategory::Trials => ProductEvent::trial_favorited(id, &title),
        };
        app.emit(event).await;
    }
    Ok(())
}

async fn favorites(
    app: &App,
    summary: bool,
    output: Option<&std::path::Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let set = app.favorites.get_favorites().await?;
    let resolved = resolve_favorites(app.search.as_ref(), &set).await?;

    if summary {
        let text = render_summary(&resolved);
        match output {
            Some(path) => {
                tokio::fs::write(path, &text).await?;
                writeln!(out, "Summary written to {}. Share it with your doctor!", path.display())?;
            }
            None => write!(out, "{text}")?,
        }
        return Ok(());
    }

    if resolved.is_empty() {
        writeln!(out, "No favorites yet. Use `curalink favorite <category> <id>` to save items.")?;
        return Ok(());
    }
    print_results(&resolved, &set, out)
}

async fn summarize(app: &App, kind: SummaryKind, id: &str, out: &mut dyn Write) -> Result<()> {
    let ctx = SearchContext::default();
    let id = id.trim();
    let (title, reply) = match kind {
        SummaryKind::Publication => {
            let p = app
                .search
                .search_publications("", &ctx)
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| CuralinkError::NotFound(format!("publication {id}")))?;
            let text = p.r#abstract.clone().unwrap_or_else(|| p.title.clone());
            (p.title, app.assistant.summarize_publication(&text).await)
        }
        SummaryKind::Trial => {
            let t = app
                .search
                .search_clinical_trials("", &ctx)
                .await?
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| CuralinkError::NotFound(format!("trial {id}")))?;
            (t.title, app.assistant.summarize_trial(&t.description).await)
        }
    };

    writeln!(out, "{title}\n")?;
    writeln!(out, "{}", reply.text())?;
    if let AssistantReply::Degraded { reason, .. } = &reply {
        writeln!(out, "\n(assistant offline: {reason})")?;
    }
    Ok(())
}

async fn chat_turn(
    app: &App,
    convo: &mut Conversation,
    message: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let reply = convo.send(&app.assistant, message).await?;
    writeln!(out, "CuraLink AI: {}", reply.text())?;
    app.emit(ProductEvent::ai_chat_message(message.trim(), reply.text()))
        .await;
    Ok(())
}

/// Read lines until EOF or `exit`; blank lines are skipped.
pub async fn chat_loop<R>(
    app: &App,
    convo: &mut Conversation,
    input: R,
    out: &mut dyn Write,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    for message in convo.messages() {
        let who = match message.role {
            curalink_assistant::Role::User => "You",
            _ => "CuraLink AI",
        };
        writeln!(out, "{who}: {}", message.content)?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "you> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit") {
            break;
        }
        chat_turn(app, convo, line, out).await?;
    }
    Ok(())
}

fn validate_meeting(args: &MeetArgs, today: NaiveDate) -> Result<(), CuralinkError> {
    require_fields(&[("date", args.date.as_str()), ("time", args.time.as_str())])?;
    let date = NaiveDate::parse_from_str(args.date.trim(), "%Y-%m-%d")
        .map_err(|_| CuralinkError::InvalidInput(format!("date must be YYYY-MM-DD: {}", args.date)))?;
    NaiveTime::parse_from_str(args.time.trim(), "%H:%M")
        .map_err(|_| CuralinkError::InvalidInput(format!("time must be HH:MM: {}", args.time)))?;
    if date < today {
        return Err(CuralinkError::InvalidInput("meeting date is in the past".into()));
    }
    if !MEETING_DURATIONS.contains(&args.duration) {
        return Err(CuralinkError::InvalidInput(format!(
            "duration must be one of 15, 30, 45 or 60 minutes, got {}",
            args.duration
        )));
    }
    Ok(())
}

async fn meet(app: &App, args: MeetArgs, out: &mut dyn Write) -> Result<()> {
    validate_meeting(&args, Local::now().date_naive())?;
    let id = args.researcher_id.trim();
    let name = entity_title(app, FavoriteCategory::Researchers, id)
        .await?
        .ok_or_else(|| CuralinkError::NotFound(format!("researcher {id}")))?;

    writeln!(
        out,
        "Your meeting request has been sent to {name}. You'll receive a confirmation email."
    )?;
    out.flush()?;

    app.emit(ProductEvent::meeting_requested(
        id,
        &name,
        json!({
            "date": args.date.trim(),
            "time": args.time.trim(),
            "duration": args.duration,
            "message": args.message.trim(),
        }),
    ))
    .await;
    Ok(())
}

async fn forum_cmd(app: &App, action: ForumAction, out: &mut dyn Write) -> Result<()> {
    match action {
        ForumAction::List { query, category } => {
            let posts = app.forum.posts().await?;
            let hits = forum::filter_posts(&posts, &query.join(" "), category.as_deref());
            writeln!(out, "Categories: {}", forum::categories(&posts).join(", "))?;
            if hits.is_empty() {
                writeln!(out, "No discussions match.")?;
            }
            for post in hits {
                writeln!(out, "\n{}", render::forum_post(post))?;
            }
        }
        ForumAction::Categories => {
            for c in AVAILABLE_CATEGORIES {
                writeln!(out, "{c}")?;
            }
        }
        ForumAction::Post {
            title,
            category,
            content,
        } => {
            let profile = app.profiles.current().await?;
            let author = profile.as_ref().map(|p| (p.name(), p.account_type()));
            let post = app
                .forum
                .create_post(
                    NewPost {
                        title,
                        category,
                        content,
                    },
                    author,
                )
                .await?;
            writeln!(out, "Your post has been published to the forum.")?;
            writeln!(out, "\n{}", render::forum_post(&post))?;
            out.flush()?;
            app.emit(ProductEvent::forum_post_created(
                &post.id,
                &post.title,
                &post.category,
            ))
            .await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use curalink_assistant::{Assistant, DegradeReason};
    use curalink_common::AccountType;
    use curalink_events::WebhookNotifier;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_app() -> App {
        App::in_memory(
            Assistant::unavailable(DegradeReason::NotConfigured),
            WebhookNotifier::disabled(),
        )
    }

    async fn exec(app: &App, args: &[&str]) -> Result<String> {
        let mut argv = vec!["curalink"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(app, cli.command, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    async fn onboard_patient(app: &App) {
        exec(
            app,
            &[
                "onboard", "patient", "--name", "John Smith", "--disease",
                "Parkinson's Disease", "--location", "Toronto, Canada",
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn onboarding_with_blank_fields_is_blocked() {
        let app = offline_app();
        let err = exec(&app, &["onboard", "patient", "--name", "John Smith"])
            .await
            .unwrap_err();
        match err.downcast_ref::<CuralinkError>() {
            Some(CuralinkError::Validation(missing)) => {
                assert_eq!(missing, &vec!["disease".to_string(), "location".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(app.profiles.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn onboarding_then_switching_account_type() {
        let app = offline_app();
        onboard_patient(&app).await;
        assert_eq!(
            app.profiles.account_type().await.unwrap(),
            Some(AccountType::Patient)
        );

        let text = exec(
            &app,
            &[
                "onboard", "researcher", "--name", "Dr. Jane Smith", "--institution",
                "Toronto Western Hospital", "--specialties", "Neurology", "--interests",
                "Movement Disorders", "--location", "Toronto, Canada",
            ],
        )
        .await
        .unwrap();
        assert!(text.contains("Switched account type from patient to researcher."));
        assert!(text.contains("Welcome, Dr. Jane Smith!"));
    }

    #[tokio::test]
    async fn profile_edit_keeps_other_fields() {
        let app = offline_app();
        onboard_patient(&app).await;
        let text = exec(&app, &["profile", "edit", "--location", "Ottawa, Canada"])
            .await
            .unwrap();
        assert!(text.contains("Location:  Ottawa, Canada"));
        assert!(text.contains("Condition: Parkinson's Disease"));

        let err = exec(&app, &["profile", "edit", "--orcid", "0000-0001"])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CuralinkError>(),
            Some(CuralinkError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn search_marks_favorites() {
        let app = offline_app();
        exec(&app, &["favorite", "trials", "NCT05123456"]).await.unwrap();

        let text = exec(&app, &["search", "parkinson", "--kind", "trials"])
            .await
            .unwrap();
        assert!(text.contains("Clinical Trials (2)"));
        assert!(text.contains("[*] NCT05123456"));
        assert!(text.contains("[ ] NCT05123458"));
        assert!(!text.contains("Health Experts"));
    }

    #[tokio::test]
    async fn favorite_toggles_and_summary_export() {
        let app = offline_app();
        let added = exec(&app, &["favorite", "researcher", "2"]).await.unwrap();
        assert!(added.contains("Saved to researchers: Dr. Renato Munhoz"));

        let summary = exec(&app, &["favorites", "--summary"]).await.unwrap();
        assert!(summary.starts_with("CuraLink - Medical Research Summary\n\nHEALTH EXPERTS\n"));
        assert!(summary.contains("Specialty: Parkinson's Disease"));

        let removed = exec(&app, &["favorite", "researchers", "2"]).await.unwrap();
        assert!(removed.contains("Removed from researchers"));
        let listing = exec(&app, &["favorites"]).await.unwrap();
        assert!(listing.contains("No favorites yet."));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let app = offline_app();
        assert!(exec(&app, &["favorite", "forums", "1"]).await.is_err());
    }

    #[tokio::test]
    async fn offline_chat_points_to_trials_and_is_remembered() {
        let app = offline_app();
        let text = exec(&app, &["chat", "Tell", "me", "about", "clinical", "trials"])
            .await
            .unwrap();
        assert!(text.starts_with("CuraLink AI: "));
        assert!(text.contains("Clinical Trials page"));

        let convo = Conversation::load(app.session()).await.unwrap();
        assert_eq!(convo.messages().len(), 3);
    }

    #[tokio::test]
    async fn chat_loop_reads_until_exit() {
        let app = offline_app();
        let mut convo = Conversation::load(app.session()).await.unwrap();
        let input: &[u8] = b"\nwhere are the forums?\nexit\nnever read\n";
        let mut out = Vec::new();
        chat_loop(&app, &mut convo, input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Forums page"));
        assert_eq!(convo.messages().len(), 3);
    }

    #[tokio::test]
    async fn offline_summaries_use_fallback_text() {
        let app = offline_app();
        let text = exec(&app, &["summarize", "trial", "NCT05123457"]).await.unwrap();
        assert!(text.starts_with("Novel Immunotherapy for Multiple System Atrophy\n"));
        assert!(text.contains("Summary not available."));
        assert!(text.contains("assistant offline"));

        assert!(exec(&app, &["summarize", "publication", "99"]).await.is_err());
    }

    #[tokio::test]
    async fn forum_post_uses_profile_author() {
        let app = offline_app();
        onboard_patient(&app).await;
        exec(
            &app,
            &[
                "forum", "post", "--title", "DBS recovery", "--category", "patient experience",
                "--content", "How long did recovery take?",
            ],
        )
        .await
        .unwrap();

        let text = exec(&app, &["forum", "list", "recovery"]).await.unwrap();
        assert!(text.contains("[Patient Experience] DBS recovery"));
        assert!(text.contains("John Smith (patient)"));
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let app = offline_app();
        onboard_patient(&app).await;
        exec(&app, &["favorite", "trials", "NCT05123456"]).await.unwrap();
        exec(&app, &["chat", "hello"]).await.unwrap();

        exec(&app, &["logout"]).await.unwrap();
        assert!(app.profiles.current().await.unwrap().is_none());
        assert!(app.favorites.get_favorites().await.unwrap().is_empty());
        let convo = Conversation::load(app.session()).await.unwrap();
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn meeting_requires_date_and_time() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let args = MeetArgs {
            researcher_id: "1".into(),
            duration: 30,
            ..Default::default()
        };
        assert!(matches!(
            validate_meeting(&args, today),
            Err(CuralinkError::Validation(ref m)) if m.len() == 2
        ));

        let ok = MeetArgs {
            date: "2025-02-01".into(),
            time: "14:30".into(),
            ..args.clone()
        };
        assert!(validate_meeting(&ok, today).is_ok());

        let past = MeetArgs {
            date: "2024-12-31".into(),
            ..ok.clone()
        };
        assert!(validate_meeting(&past, today).is_err());

        let odd = MeetArgs { duration: 20, ..ok };
        assert!(validate_meeting(&odd, today).is_err());
    }

    /// Records when output first arrived.
    struct StampedOutput {
        buf: Vec<u8>,
        first_write: Option<std::time::Instant>,
    }

    impl Write for StampedOutput {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.first_write.get_or_insert_with(std::time::Instant::now);
            self.buf.write(bytes)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_webhook_does_not_hold_back_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(1500)))
            .mount(&server)
            .await;
        let app = App::in_memory(
            Assistant::unavailable(DegradeReason::NotConfigured),
            WebhookNotifier::new(&format!("{}/webhook/curalink", server.uri())).unwrap(),
        );

        for args in [
            &["favorite", "trials", "NCT05123456"][..],
            &["search", "gait"][..],
            &["meet", "1", "--date", "2999-01-01", "--time", "10:00"][..],
        ] {
            let mut argv = vec!["curalink"];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).unwrap();
            let mut out = StampedOutput {
                buf: Vec::new(),
                first_write: None,
            };
            let started = std::time::Instant::now();
            run(&app, cli.command, &mut out).await.unwrap();

            let printed_after = out.first_write.unwrap() - started;
            assert!(
                printed_after < std::time::Duration::from_millis(1000),
                "{args:?} printed after {printed_after:?}"
            );
            assert!(started.elapsed() >= std::time::Duration::from_millis(1500));
            assert!(!out.buf.is_empty());
        }
    }

    #[tokio::test]
    async fn favorite_emits_webhook_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/curalink"))
            .and(body_partial_json(serde_json::json!({
                "eventType": "publication_saved",
                "payload": { "publicationId": "3" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let app = App::in_memory(
            Assistant::unavailable(DegradeReason::NotConfigured),
            WebhookNotifier::new(&format!("{}/webhook/curalink", server.uri())).unwrap(),
        );
        exec(&app, &["favorite", "publications", "3"]).await.unwrap();
    }
}
