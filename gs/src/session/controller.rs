//! SessionController - owns the studio state and drives the architect
//!
//! Every operation takes `&self`. State sits behind a mutex that is released
//! before any architect call, so a detection and a chat can overlap while a
//! second operation of the same kind is turned away by its busy flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::intent::Intent;
use super::state::{BusyFlags, BusyGuard, ChatOutcome, Detection, SessionError, StudioInputs, View};
use crate::domain::{ChatMessage, DesignComplexity, DesignProject, EncodedImage, FeatureSelection, GardenStyle, project_name};
use crate::llm::{ArchitectClient, ConsultRequest, DesignRequest};
use crate::prompts::PromptLoader;
use crate::store::ProjectStore;

struct AppState {
    view: View,
    inputs: StudioInputs,
    store: ProjectStore,
    /// Id of the project shown in the studio
    active: Option<String>,
}

/// Single owner of studio state and the only caller of the architect
pub struct SessionController {
    client: Arc<dyn ArchitectClient>,
    prompts: Arc<PromptLoader>,
    state: Mutex<AppState>,
    detecting: AtomicBool,
    generating: AtomicBool,
    chatting: AtomicBool,
}

impl SessionController {
    pub fn new(
        client: Arc<dyn ArchitectClient>,
        prompts: Arc<PromptLoader>,
        store: ProjectStore,
        default_style: Option<GardenStyle>,
        default_complexity: DesignComplexity,
    ) -> Self {
        debug!(projects = store.len(), "SessionController::new: called");
        Self {
            client,
            prompts,
            state: Mutex::new(AppState {
                view: View::Landing,
                inputs: StudioInputs::new(default_style, default_complexity),
                store,
                active: None,
            }),
            detecting: AtomicBool::new(false),
            generating: AtomicBool::new(false),
            chatting: AtomicBool::new(false),
        }
    }

    // === Landing inputs ===

    /// Set the yard photo and detect its features
    ///
    /// Prior detections are cleared first. On success every detected feature
    /// is selected for keeping; a failed detection leaves the selection empty.
    pub async fn upload_yard_photo(&self, image: EncodedImage) -> Detection {
        let Some(_busy) = BusyGuard::acquire(&self.detecting) else {
            debug!("upload_yard_photo: detection in flight, ignoring");
            return Detection::Ignored;
        };

        {
            let mut state = self.state.lock().await;
            state.inputs.yard_photo = Some(image.clone());
            state.inputs.selection = FeatureSelection::default();
        }

        match self.client.detect_features(&image).await {
            Ok(labels) => {
                let selection = FeatureSelection::from_detected(labels);
                let detected = selection.detected().to_vec();
                info!(count = detected.len(), "Yard photo analyzed");
                self.state.lock().await.inputs.selection = selection;
                Detection::Found(detected)
            }
            Err(e) => {
                error!(error = %e, "Object detection failed");
                Detection::Failed(e)
            }
        }
    }

    /// Set the reference design; a reference replaces the chosen style
    pub async fn upload_reference_image(&self, image: EncodedImage) {
        let mut state = self.state.lock().await;
        if !image.data().is_empty() {
            state.inputs.style = None;
        }
        state.inputs.reference_image = Some(image);
    }

    pub async fn clear_reference_image(&self) {
        self.state.lock().await.inputs.reference_image = None;
    }

    /// Choose a named style; a style replaces the reference design
    pub async fn select_style(&self, style: GardenStyle) {
        let mut state = self.state.lock().await;
        state.inputs.style = Some(style);
        state.inputs.reference_image = None;
    }

    pub async fn set_complexity(&self, complexity: DesignComplexity) {
        self.state.lock().await.inputs.complexity = complexity;
    }

    pub async fn set_requirements(&self, text: &str) {
        self.state.lock().await.inputs.requirements = text.to_string();
    }

    /// Flip whether a detected feature is kept
    ///
    /// Returns the new membership, or `None` for a label that was never detected.
    pub async fn toggle_feature(&self, label: &str) -> Option<bool> {
        self.state.lock().await.inputs.selection.toggle(label)
    }

    /// Keep exactly the given features, returning labels that matched nothing
    pub async fn keep_only(&self, labels: &[String]) -> Vec<String> {
        self.state.lock().await.inputs.selection.keep_only(labels)
    }

    // === Design ===

    /// Generate the first design from the landing inputs
    ///
    /// Returns `Ok(None)` when a generation is already running. On success a
    /// new project is prepended, made active and the view moves to the studio.
    /// On failure nothing changes.
    pub async fn start_design(&self) -> Result<Option<DesignProject>, SessionError> {
        let Some(_busy) = BusyGuard::acquire(&self.generating) else {
            debug!("start_design: generation in flight, ignoring");
            return Ok(None);
        };

        let inputs = self.state.lock().await.inputs.clone();
        let base_image = inputs.yard_photo.clone().ok_or(SessionError::NoYardPhoto)?;
        let style = inputs.effective_style();
        let kept_features = inputs.selection.kept();

        let instruction = self
            .prompts
            .design_instruction(style, &inputs.requirements)
            .map_err(|e| SessionError::Prompt(e.to_string()))?;
        let welcome = self
            .prompts
            .welcome_message(style, inputs.complexity, &inputs.requirements)
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        info!(?style, complexity = %inputs.complexity, kept = kept_features.len(), "Generating design");
        let request = DesignRequest {
            base_image: base_image.clone(),
            reference_image: inputs.reference_image.clone(),
            instruction,
            style,
            kept_features: kept_features.clone(),
            complexity: inputs.complexity,
        };

        let image = match self.client.generate_design(request).await {
            Ok(image) => image,
            Err(e) => {
                error!(error = %e, "Design generation failed");
                return Err(e.into());
            }
        };

        let project = DesignProject {
            id: Uuid::now_v7().to_string(),
            name: project_name(style),
            original_image: base_image,
            reference_image: inputs.reference_image,
            current_image: image,
            style,
            complexity: inputs.complexity,
            kept_features,
            history: vec![ChatMessage::assistant(welcome)],
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let mut state = self.state.lock().await;
        state.store.prepend(project.clone());
        state.active = Some(project.id.clone());
        state.view = View::Studio;
        info!(id = %project.id, name = %project.name, "Design created");

        Ok(Some(project))
    }

    // === Chat ===

    /// Send a chat message about the active project
    ///
    /// The message is appended to history before the architect answers and
    /// stays there if the call fails.
    pub async fn send_message(&self, text: &str) -> ChatOutcome {
        let message = text.trim();
        if message.is_empty() {
            return ChatOutcome::Ignored;
        }

        let Some(_chatting) = BusyGuard::acquire(&self.chatting) else {
            debug!("send_message: chat in flight, ignoring");
            return ChatOutcome::Ignored;
        };

        let Some(project) = self.active_project().await else {
            debug!("send_message: no active project");
            return ChatOutcome::Ignored;
        };

        let intent = Intent::classify(message);
        debug!(?intent, id = %project.id, "send_message: classified");

        match intent {
            Intent::ModifyImage => {
                let Some(_generating) = BusyGuard::acquire(&self.generating) else {
                    debug!("send_message: generation in flight, ignoring");
                    return ChatOutcome::Ignored;
                };
                self.redesign(project, message).await
            }
            Intent::Advice => self.advise(project, message).await,
        }
    }

    async fn redesign(&self, project: DesignProject, message: &str) -> ChatOutcome {
        self.append(&project.id, ChatMessage::user(message), None).await;

        let instruction = match self.prompts.refine_instruction(message) {
            Ok(text) => text,
            Err(e) => return ChatOutcome::Failed(SessionError::Prompt(e.to_string())),
        };
        let acknowledgement = match self.prompts.refined_message() {
            Ok(text) => text,
            Err(e) => return ChatOutcome::Failed(SessionError::Prompt(e.to_string())),
        };

        let request = DesignRequest {
            base_image: project.original_image.clone(),
            reference_image: project.reference_image.clone(),
            instruction,
            style: project.style,
            kept_features: project.kept_features.clone(),
            complexity: project.complexity,
        };

        match self.client.generate_design(request).await {
            Ok(image) => {
                let reply = ChatMessage::assistant_with_image(acknowledgement, image.clone());
                self.append(&project.id, reply.clone(), Some(image)).await;
                info!(id = %project.id, "Design updated from chat");
                ChatOutcome::Redesigned(reply)
            }
            Err(e) => {
                error!(id = %project.id, error = %e, "Redesign failed");
                ChatOutcome::Failed(e.into())
            }
        }
    }

    async fn advise(&self, project: DesignProject, message: &str) -> ChatOutcome {
        let user = ChatMessage::user(message);
        let mut history = project.history.clone();
        history.push(user.clone());
        self.append(&project.id, user, None).await;

        let request = ConsultRequest {
            history,
            image: project.current_image.clone(),
            message: message.to_string(),
        };

        match self.client.consult(request).await {
            Ok(text) => {
                let reply = ChatMessage::assistant(text);
                self.append(&project.id, reply.clone(), None).await;
                ChatOutcome::Advised(reply)
            }
            Err(e) => {
                error!(id = %project.id, error = %e, "Consultation failed");
                ChatOutcome::Failed(e.into())
            }
        }
    }

    /// Append to a stored project's history, optionally replacing its render
    async fn append(&self, id: &str, message: ChatMessage, image: Option<EncodedImage>) {
        let mut state = self.state.lock().await;
        let Some(mut project) = state.store.get(id).cloned() else {
            warn!(%id, "append: project no longer stored");
            return;
        };
        project.history.push(message);
        if let Some(image) = image {
            project.current_image = image;
        }
        state.store.replace(project);
    }

    // === Views ===

    pub async fn show_gallery(&self) {
        self.state.lock().await.view = View::Gallery;
    }

    /// Make a stored project active, by id or unique id prefix
    pub async fn open_project(&self, id: &str) -> Result<DesignProject, SessionError> {
        let mut state = self.state.lock().await;
        let project = state
            .store
            .resolve(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownProject(id.to_string()))?;
        state.active = Some(project.id.clone());
        state.view = View::Studio;
        debug!(id = %project.id, "open_project: opened");
        Ok(project)
    }

    /// Back to the landing view; landing inputs are kept
    pub async fn new_project(&self) {
        self.state.lock().await.view = View::Landing;
    }

    // === Accessors ===

    pub async fn view(&self) -> View {
        self.state.lock().await.view
    }

    pub async fn active_project(&self) -> Option<DesignProject> {
        let state = self.state.lock().await;
        state.active.as_deref().and_then(|id| state.store.get(id)).cloned()
    }

    /// All projects, newest first
    pub async fn projects(&self) -> Vec<DesignProject> {
        self.state.lock().await.store.list().to_vec()
    }

    pub async fn inputs(&self) -> StudioInputs {
        self.state.lock().await.inputs.clone()
    }

    pub fn busy(&self) -> BusyFlags {
        BusyFlags {
            detecting: self.detecting.load(Ordering::Acquire),
            generating: self.generating.load(Ordering::Acquire),
            chatting: self.chatting.load(Ordering::Acquire),
        }
    }
}
