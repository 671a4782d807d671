//! The guide build: folders, presentation, one page per image, then the
//! fixed content placed on pages by role.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::api::{DeckEditor, FileStore, ObjectStore};
use crate::models::drive::{FileKind, folder_query};
use crate::models::slides::{Frame, TextBox, Video};
use crate::prompt::{self, Prompter};
use crate::session::{PageRole, Session};

const VIDEO_FRAME: Frame = Frame::new(600, 337, 180, 110);
const TRANSITION_FRAME: Frame = Frame::new(720, 50, 360, 450);

const FONT_LIST_TOP: i64 = 180;
const FONT_LIST_STEP: i64 = 40;

const STREAMLABS_ALERTS_URL: &str =
    "https://streamlabs.com/content-hub/post/setting-up-your-streamlabs-alerts";

/// Role of the n-th image page when its file name carries no `@role` tag.
const DEFAULT_ROLES: &[(usize, PageRole)] = &[
    (3, PageRole::Fonts),
    (4, PageRole::ObsInstall),
    (5, PageRole::SlobsInstall),
    (6, PageRole::StingerObs),
    (7, PageRole::StingerSlobs),
    (8, PageRole::Alerts),
];

pub struct GuideOptions {
    pub parent_folder: String,
    pub images: Option<PathBuf>,
}

#[derive(Debug)]
pub struct GuideSummary {
    pub name: String,
    pub folder_id: String,
    pub presentation_id: String,
    pub pages: usize,
}

pub async fn build_guide<F, D, O, P>(
    session: &mut Session<F, D, O>,
    prompter: &mut P,
    options: &GuideOptions,
) -> Result<GuideSummary>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
    P: Prompter,
{
    // 1. Resolve the parent folder
    println!("Looking up folder '{}'...", options.parent_folder);
    let parent_id = session
        .find_id_by_name(&folder_query(&options.parent_folder), &options.parent_folder)
        .await?
        .with_context(|| format!("Folder '{}' not found in Drive", options.parent_folder))?;

    // 2. Ask for the guide name and image directory
    let name = prompter.input("Enter in the name of the guide")?.trim().to_string();
    if name.is_empty() {
        bail!("Guide name cannot be empty");
    }
    println!("The Guide Name is: {}", name);

    let image_dir = match &options.images {
        Some(dir) => dir.clone(),
        None => prompt::clean_path(
            &prompter.input("Please input the path for the images for this Guide")?,
        ),
    };
    let images = list_images(&image_dir).await?;
    println!("Found {} images in {}", images.len(), image_dir.display());

    // 3. Folder and presentation
    let folder_id = session
        .create_in_parent(&parent_id, &name, FileKind::Folder)
        .await?;
    println!("The Guide Folder ID is: {}", folder_id);

    let presentation_id = session.create_presentation(&folder_id, &name).await?;
    println!("The Presentation ID is: {}", presentation_id);

    // 4. Drop the auto-created slide
    if session.delete_first_page().await?.is_some() {
        println!("The first slide was deleted.");
    }

    // 5. One page per image
    for (index, path) in images.iter().enumerate() {
        let role = role_for(index, path);
        session.add_image_page(role, path).await?;
        println!(
            "Added page {}/{} from {}",
            index + 1,
            images.len(),
            path.display()
        );
    }

    // 6. Content by role
    populate(session, prompter).await?;

    println!("Guide '{}' built successfully.", name);
    Ok(GuideSummary {
        name,
        folder_id,
        presentation_id,
        pages: session.pages().len(),
    })
}

async fn populate<F, D, O, P>(session: &Session<F, D, O>, prompter: &mut P) -> Result<()>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
    P: Prompter,
{
    match page(session, PageRole::Fonts) {
        Some(page_id) => add_fonts(session, prompter, &page_id).await?,
        None => log::warn!("No fonts page, skipping font list"),
    }

    for (role, short_name, video_id) in [
        (PageRole::ObsInstall, "obs_install", "Gr4XgEt2eXM"),
        (PageRole::SlobsInstall, "slobs_install", "5X--doqvyRE"),
        (PageRole::StingerObs, "stinger_obs", "7KtAZTZ8rtM"),
    ] {
        add_video(session, role, short_name, video_id).await?;
    }

    let stinger_pages = [
        page(session, PageRole::StingerObs),
        page(session, PageRole::StingerSlobs),
    ];
    let transition = if stinger_pages.iter().any(Option::is_some) {
        Some(prompt::ask_transition_point(prompter)?.text())
    } else {
        None
    };

    if let (Some(page_id), Some(text)) = (&stinger_pages[0], &transition) {
        session
            .add_text(page_id, &text_box("trans_obs", text, None, 16, TRANSITION_FRAME))
            .await?;
    }

    add_video(session, PageRole::StingerSlobs, "stinger_slobs", "cEMJAiRE47o").await?;

    if let (Some(page_id), Some(text)) = (&stinger_pages[1], &transition) {
        session
            .add_text(page_id, &text_box("trans_slobs", text, None, 16, TRANSITION_FRAME))
            .await?;
    }

    match page(session, PageRole::Alerts) {
        Some(page_id) => add_alerts(session, &page_id).await?,
        None => log::warn!("No alerts page, skipping alert instructions"),
    }

    Ok(())
}

async fn add_fonts<F, D, O, P>(
    session: &Session<F, D, O>,
    prompter: &mut P,
    page_id: &str,
) -> Result<()>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
    P: Prompter,
{
    session
        .add_text(
            page_id,
            &text_box(
                "font_description",
                "Download and Install all the following fonts to your computer:",
                None,
                18,
                Frame::new(720, 50, 120, 130),
            ),
        )
        .await?;

    let mut count = 1;
    loop {
        let font_name = prompter.input("Enter the name of the font")?;
        let font_url = prompter.input(&format!("Enter in the URL for the font: {}", font_name))?;

        let y = FONT_LIST_TOP + FONT_LIST_STEP * (count - 1);
        session
            .add_text(
                page_id,
                &text_box(
                    &format!("font_{}", count),
                    font_name.trim(),
                    Some(font_url.trim()),
                    16,
                    Frame::new(720, 50, 120, y),
                ),
            )
            .await?;

        count += 1;
        if !prompter.confirm("Do you have any more fonts to add?")? {
            break;
        }
    }

    Ok(())
}

async fn add_alerts<F, D, O>(session: &Session<F, D, O>, page_id: &str) -> Result<()>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
{
    let boxes = [
        text_box(
            "alert_description_1",
            "Please follow instructions from StreamLabs to setup your Alerts!",
            None,
            18,
            Frame::new(720, 50, 120, 110),
        ),
        text_box(
            "streamlabs_link",
            "Setting up your Alerts",
            Some(STREAMLABS_ALERTS_URL),
            18,
            Frame::new(720, 50, 120, 180),
        ),
        text_box(
            "alert_description_2",
            "Add your alerts into StreamLabs online and you're up and ready!",
            None,
            18,
            Frame::new(720, 50, 120, 240),
        ),
        text_box(
            "alert_description_3",
            "Feel free to customize them as needed!",
            None,
            18,
            Frame::new(720, 50, 120, 270),
        ),
    ];

    for text in &boxes {
        session.add_text(page_id, text).await?;
    }
    Ok(())
}

async fn add_video<F, D, O>(
    session: &Session<F, D, O>,
    role: PageRole,
    short_name: &str,
    video_id: &str,
) -> Result<()>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
{
    let Some(page_id) = page(session, role) else {
        log::warn!("No {:?} page, skipping video {}", role, short_name);
        return Ok(());
    };

    let video = Video {
        short_name: short_name.to_string(),
        video_id: video_id.to_string(),
        frame: VIDEO_FRAME,
    };
    session.add_video(&page_id, &video).await?;
    Ok(())
}

fn page<F, D, O>(session: &Session<F, D, O>, role: PageRole) -> Option<String>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
{
    session.page_for(role).map(str::to_string)
}

fn text_box(
    short_name: &str,
    text: &str,
    link: Option<&str>,
    font_size: i64,
    frame: Frame,
) -> TextBox {
    TextBox {
        short_name: short_name.to_string(),
        text: text.to_string(),
        link: link.map(str::to_string),
        font_size,
        frame,
    }
}

/// `04@fonts.png` is tagged `fonts`; untagged files fall back to their position.
fn role_for(index: usize, path: &Path) -> PageRole {
    let tagged = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .and_then(|stem| stem.rsplit_once('@').and_then(|(_, tag)| PageRole::from_tag(tag)));

    tagged.unwrap_or_else(|| {
        DEFAULT_ROLES
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, role)| *role)
            .unwrap_or(PageRole::Image)
    })
}

/// Regular, non-hidden files in `dir`, sorted by file name.
async fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut images = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read {}", dir.display()))?
    {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().await?.is_file() {
            images.push(entry.path());
        }
    }

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}
