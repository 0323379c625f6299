//! Integration tests for Garden Studio
//!
//! These tests drive the session controller end to end against a scripted
//! architect and a real on-disk project store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gardenstudio::domain::{DesignComplexity, EncodedImage, GardenStyle, Role};
use gardenstudio::llm::{ArchitectClient, ConsultRequest, DesignRequest, LlmError};
use gardenstudio::prompts::PromptLoader;
use gardenstudio::session::{ChatOutcome, Detection, SessionController, View};
use gardenstudio::store::{PROJECTS_KEY, ProjectStore};
use keystore::{KeyStore, StoreOptions};
use tempfile::TempDir;

/// Architect that renders numbered images and answers advice with a fixed line
#[derive(Default)]
struct ScriptedArchitect {
    labels: Vec<String>,
    renders: Mutex<VecDeque<Result<EncodedImage, LlmError>>>,
    design_requests: Mutex<Vec<DesignRequest>>,
}

impl ScriptedArchitect {
    fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn render(self, result: Result<EncodedImage, LlmError>) -> Self {
        self.renders.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl ArchitectClient for ScriptedArchitect {
    async fn detect_features(&self, _image: &EncodedImage) -> Result<Vec<String>, LlmError> {
        Ok(self.labels.clone())
    }

    async fn generate_design(&self, request: DesignRequest) -> Result<EncodedImage, LlmError> {
        self.design_requests.lock().unwrap().push(request);
        self.renders
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::NoImageData))
    }

    async fn consult(&self, request: ConsultRequest) -> Result<String, LlmError> {
        Ok(format!("Noted: {}", request.message))
    }
}

fn image(data: &str) -> EncodedImage {
    EncodedImage::new("image/png", data)
}

fn controller(dir: &TempDir, architect: Arc<ScriptedArchitect>) -> SessionController {
    SessionController::new(
        architect,
        Arc::new(PromptLoader::embedded_only()),
        ProjectStore::open(dir.path(), None),
        Some(GardenStyle::Modern),
        DesignComplexity::Balanced,
    )
}

#[tokio::test]
async fn test_projects_persist_across_sessions() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let architect = Arc::new(ScriptedArchitect::new(&["Oak Tree", "Utility Box"]).render(Ok(image("RklSU1Q="))));
    let first = controller(&dir, architect);

    let detection = first.upload_yard_photo(image("WUFSRA==")).await;
    assert!(matches!(detection, Detection::Found(ref labels) if labels.len() == 2));
    first.select_style(GardenStyle::Mediterranean).await;
    first.set_complexity(DesignComplexity::Premium).await;

    let project = first.start_design().await.unwrap().unwrap();
    let outcome = first.send_message("Which shrubs need the least water?").await;
    assert!(matches!(outcome, ChatOutcome::Advised(_)));

    // A fresh session sees the stored project with its whole conversation
    let second = controller(&dir, Arc::new(ScriptedArchitect::new(&[])));
    let projects = second.projects().await;
    assert_eq!(projects.len(), 1);

    let stored = &projects[0];
    assert_eq!(stored.id, project.id);
    assert_eq!(stored.name, "My Mediterranean Garden");
    assert_eq!(stored.complexity, DesignComplexity::Premium);
    assert_eq!(stored.kept_features, vec!["Oak Tree", "Utility Box"]);
    assert_eq!(stored.history.len(), 3);
    assert_eq!(stored.history[1].role, Role::User);
    assert_eq!(stored.history[2].content, "Noted: Which shrubs need the least water?");
    assert_eq!(second.view().await, View::Landing);
}

#[tokio::test]
async fn test_reopened_project_redesigns_from_original_photo() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let first = controller(&dir, Arc::new(ScriptedArchitect::new(&["Fountain"]).render(Ok(image("RklSU1Q=")))));
    first.upload_yard_photo(image("WUFSRA==")).await;
    let project = first.start_design().await.unwrap().unwrap();

    let architect = Arc::new(ScriptedArchitect::new(&[]).render(Ok(image("U0VDT05E"))));
    let second = controller(&dir, architect.clone());
    second.open_project(&project.id).await.unwrap();

    let outcome = second.send_message("Plant lavender along the walk").await;
    assert!(matches!(outcome, ChatOutcome::Redesigned(_)));

    let requests = architect.design_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].base_image, image("WUFSRA=="));
    assert_eq!(requests[0].kept_features, vec!["Fountain"]);

    let third = controller(&dir, Arc::new(ScriptedArchitect::new(&[])));
    let stored = third.projects().await.remove(0);
    assert_eq!(stored.current_image, image("U0VDT05E"));
    assert_eq!(stored.render_count(), 2);
}

#[tokio::test]
async fn test_failed_generation_stores_nothing() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let session = controller(&dir, Arc::new(ScriptedArchitect::new(&[]).render(Err(LlmError::NoDesign))));
    session.upload_yard_photo(image("WUFSRA==")).await;
    assert!(session.start_design().await.is_err());

    let backend = KeyStore::open(dir.path(), StoreOptions::default()).unwrap();
    assert!(backend.get(PROJECTS_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_stored_json_uses_data_urls() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let session = controller(&dir, Arc::new(ScriptedArchitect::new(&[]).render(Ok(image("RklSU1Q=")))));
    session.upload_yard_photo(image("WUFSRA==")).await;
    session.start_design().await.unwrap();

    let backend = KeyStore::open(dir.path(), StoreOptions::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&backend.get(PROJECTS_KEY).unwrap().unwrap()).unwrap();
    let project = &json[0];
    assert_eq!(project["originalImage"], "data:image/png;base64,WUFSRA==");
    assert_eq!(project["currentImage"], "data:image/png;base64,RklSU1Q=");
    assert_eq!(project["style"], "Modern Minimalist");
    assert_eq!(project["complexity"], "Balanced & Practical");
    assert!(project["createdAt"].is_i64());
    assert_eq!(project["history"][0]["role"], "assistant");
}
