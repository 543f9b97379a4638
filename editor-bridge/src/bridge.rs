//! The mounted editor screen.
//!
//! [`Bridge`] owns the pieces that outlive a single render: the lifecycle
//! sequencer, the tick counter and the title state. Every render publishes a
//! fresh [`Controller`] to the registry; engine callbacks go through an
//! [`EngineRouter`] that looks the controller up again on each call, so a
//! long-lived engine always talks to the latest one.

use std::cell::RefCell;
use std::rc::Rc;

use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, ScrollEvent, Settings,
};

use crate::boundary::{BoundaryAction, BoundaryClickResolver};
use crate::chrome::ChromeState;
use crate::config::BridgeConfig;
use crate::controller::{Controller, ControllerParts, TickCounter, TitleState};
use crate::dispatch::{Dispatch, SideChannelDispatcher};
use crate::engine::{EngineEvents, EngineFactory, EngineOptions, InstanceId, SharedEngine};
use crate::host::Host;
use crate::lifecycle::{EngineDeps, LifecycleSequencer, LifecycleState, Transition};
use crate::permission::{Claim, Claims, PermissionGate};
use crate::registry::{BridgeContext, ControllerRegistry};
use crate::sync::ContentSynchronizer;
use crate::target::{ContentStyle, RenderTarget, ScrollContainer};

/// Engine-facing side of the bridge.
///
/// Never borrows the engine: callbacks arrive while the engine is mid-edit.
pub struct EngineRouter {
    context: BridgeContext,
    sync: ContentSynchronizer,
    dispatcher: SideChannelDispatcher,
    permissions: PermissionGate,
}

impl EngineRouter {
    pub fn new(context: BridgeContext) -> Self {
        Self {
            dispatcher: SideChannelDispatcher::new(Rc::clone(&context)),
            context,
            sync: ContentSynchronizer::new(),
            permissions: PermissionGate::default(),
        }
    }

    pub fn synchronizer(&self) -> &ContentSynchronizer {
        &self.sync
    }

    pub fn permissions(&self) -> &PermissionGate {
        &self.permissions
    }
}

impl EngineEvents for EngineRouter {
    fn on_update(&self, snapshot: DocumentSnapshot, ignore_edit: Option<bool>) {
        let controller = self.context.controller();
        self.sync
            .on_engine_update(controller.as_deref(), &snapshot, ignore_edit);
    }

    fn open_attachment_picker(&self, kind: AttachmentKind) -> Dispatch<()> {
        self.dispatcher.open_attachment_picker(kind)
    }

    fn download_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        self.dispatcher.download_attachment(attachment)
    }

    fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        self.dispatcher.preview_attachment(attachment)
    }

    fn get_attachment_data(&self, attachment: &AttachmentDescriptor) -> Dispatch<AttachmentData> {
        self.dispatcher.get_attachment_data(attachment)
    }

    fn open_link(&self, url: &str) -> bool {
        self.dispatcher.open_link(url)
    }

    fn copy_to_clipboard(&self, text: &str) {
        self.dispatcher.copy_to_clipboard(text)
    }

    fn check_permission(&self, claim: Claim) -> bool {
        let controller = self.context.controller();
        self.permissions
            .check(claim, controller.as_ref().map(|c| c.host().as_ref()))
    }
}

pub struct Bridge {
    config: BridgeConfig,
    host: Rc<dyn Host>,
    factory: Rc<dyn EngineFactory>,
    container: Rc<dyn ScrollContainer>,
    context: BridgeContext,
    router: Rc<EngineRouter>,
    lifecycle: LifecycleSequencer,
    resolver: BoundaryClickResolver,
    tick: TickCounter,
    titles: Rc<RefCell<TitleState>>,
    settings: Option<Settings>,
    renders: u64,
    mounted: bool,
}

impl Bridge {
    pub fn mount(
        config: BridgeConfig,
        host: Rc<dyn Host>,
        factory: Rc<dyn EngineFactory>,
        container: Rc<dyn ScrollContainer>,
    ) -> Self {
        let context = ControllerRegistry::new_context();
        let router = Rc::new(EngineRouter::new(Rc::clone(&context)));
        let titles = Rc::new(RefCell::new(TitleState {
            title: String::new(),
            placeholder: config.title_placeholder.clone(),
        }));
        tracing::info!("editor bridge mounted");

        Self {
            resolver: BoundaryClickResolver::new(&config),
            config,
            host,
            factory,
            container,
            context,
            router,
            lifecycle: LifecycleSequencer::new(),
            tick: TickCounter::default(),
            titles,
            settings: None,
            renders: 0,
            mounted: true,
        }
    }

    pub fn context(&self) -> BridgeContext {
        Rc::clone(&self.context)
    }

    pub fn router(&self) -> &EngineRouter {
        &self.router
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        self.lifecycle.instance_id()
    }

    pub fn engine(&self) -> Option<SharedEngine> {
        self.lifecycle.engine()
    }

    pub fn controller(&self) -> Option<Rc<Controller>> {
        self.context.controller()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Render with the given settings.
    ///
    /// Publishes a new controller, refreshes the permission claims, then
    /// rebuilds the engine only if a construction dependency changed.
    pub fn render(&mut self, settings: Settings) -> Transition {
        if !self.mounted {
            tracing::warn!("render after unmount ignored");
            return Transition::Unchanged;
        }
        self.renders += 1;
        self.router.permissions.update(Claims {
            premium: settings.premium,
        });

        let controller = Rc::new(Controller::new(ControllerParts {
            host: Rc::clone(&self.host),
            generation: self.renders,
            tick: self.tick.clone(),
            titles: Rc::clone(&self.titles),
            container: Rc::clone(&self.container),
            default_placeholder: self.config.title_placeholder.clone(),
        }));
        self.context
            .publish(Rc::clone(&controller), self.lifecycle.engine());

        self.lifecycle
            .restyle(ContentStyle::from_settings(&settings, &self.config));
        let transition = self.sync_engine(&settings, &controller);
        self.settings = Some(settings);
        transition
    }

    /// The view finished layout and handed over its render target.
    pub fn attach_target(&mut self, target: Rc<dyn RenderTarget>) -> Transition {
        if !self.mounted {
            tracing::warn!(target_id = target.id(), "render target after unmount ignored");
            return Transition::Unchanged;
        }
        if !self.lifecycle.attach_target(target) {
            return Transition::Unchanged;
        }
        let (Some(settings), Some(controller)) = (self.settings.clone(), self.context.controller())
        else {
            return Transition::Deferred;
        };
        self.sync_engine(&settings, &controller)
    }

    /// Host pushed new content out of band.
    pub fn update(&mut self) -> Transition {
        if !self.mounted {
            return Transition::Unchanged;
        }
        if let Some(controller) = self.context.controller() {
            controller.update();
        } else {
            self.tick.bump();
        }
        match self.settings.clone() {
            Some(settings) => self.render(settings),
            None => Transition::Deferred,
        }
    }

    fn sync_engine(&mut self, settings: &Settings, controller: &Controller) -> Transition {
        let deps = EngineDeps::new(settings, self.tick.get());
        let factory = Rc::clone(&self.factory);
        let events: Rc<dyn EngineEvents> = self.router.clone();
        let host = Rc::clone(&self.host);
        let router = Rc::clone(&self.router);

        let transition = self.lifecycle.sync(deps, |target| {
            let options = EngineOptions {
                content: router.sync.initial_content(controller),
                editable: !settings.readonly,
                double_spaced_lines: settings.double_spaced_lines,
                date_format: settings.date_format.clone(),
                time_format: settings.time_format,
                cors_host: settings.cors_proxy.clone(),
                is_mobile: true,
            };
            factory.create(target, options, events).map_err(|error| {
                host.report_error(&error);
                error
            })
        });

        match transition {
            Transition::Built(_) | Transition::Rebuilt { .. } | Transition::Failed => {
                self.context.publish_editor(self.lifecycle.engine());
            }
            Transition::Deferred | Transition::Unchanged => {}
        }
        transition
    }

    /// Double tap on a chrome element above the document.
    pub fn double_click(&self, element_id: &str) -> BoundaryAction {
        let editor = self.context.editor();
        self.resolver
            .double_click(element_id, self.container.as_ref(), editor.as_ref())
    }

    /// Tap in the empty zone under the document.
    pub fn bottom_tap(&self) -> BoundaryAction {
        let editor = self.context.editor();
        self.resolver.bottom_tap(editor.as_ref())
    }

    pub fn scroll(&self, event: ScrollEvent) {
        if let Some(controller) = self.context.controller() {
            controller.scroll(event);
        }
    }

    /// Chrome props for the last rendered settings
    pub fn chrome(&self) -> Option<ChromeState> {
        let settings = self.settings.as_ref()?;
        let editor = self.context.editor();
        Some(ChromeState::derive(
            settings,
            editor.as_ref(),
            self.lifecycle.has_target(),
            &self.config,
        ))
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let discarded = self.lifecycle.teardown();
        self.context.clear();
        self.mounted = false;
        tracing::info!(
            instance_id = ?discarded,
            delivered = self.router.sync.delivered(),
            "editor bridge unmounted"
        );
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        // The registry holds the engine, which holds the router, which holds the registry.
        self.unmount();
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("state", &self.lifecycle.state())
            .field("renders", &self.renders)
            .field("tick", &self.tick.get())
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}
