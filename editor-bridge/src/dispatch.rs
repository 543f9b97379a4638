//! Side-channel dispatch: routes editor-originated requests to the host.
//!
//! Every request is answered immediately with a [`Dispatch`]: an acceptance
//! flag the engine can act on synchronously, plus a [`Completion`] that
//! resolves once the host finishes. A missing or failing handler never
//! unwinds into the engine; it turns into `accepted = false` (or an empty
//! completion) and a call to the host's error channel.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use shared_types::{AttachmentData, AttachmentDescriptor, AttachmentKind};

use crate::controller::Controller;
use crate::error::{BridgeError, HostResult};
use crate::host::{Host, HostReply};
use crate::registry::BridgeContext;

/// Completion notification of an accepted request.
///
/// Resolves to `None` when the request was rejected or the host failed
/// after accepting it.
#[must_use = "completions do nothing unless awaited or dropped explicitly"]
pub struct Completion<T>(LocalBoxFuture<'static, Option<T>>);

impl<T: 'static> Completion<T> {
    pub fn ready(value: T) -> Self {
        Self(Box::pin(futures::future::ready(Some(value))))
    }

    pub fn empty() -> Self {
        Self(Box::pin(futures::future::ready(None)))
    }
}

impl<T> Future for Completion<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

/// Immediate answer to the engine plus the deferred result
pub struct Dispatch<T> {
    accepted: bool,
    completion: Completion<T>,
}

impl<T: 'static> Dispatch<T> {
    pub fn accepted(completion: Completion<T>) -> Self {
        Self {
            accepted: true,
            completion,
        }
    }

    pub fn rejected() -> Self {
        Self {
            accepted: false,
            completion: Completion::empty(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn into_completion(self) -> Completion<T> {
        self.completion
    }
}

impl<T: 'static> Dispatch<Option<T>> {
    fn flatten(self) -> Dispatch<T> {
        let completion = self.completion;
        Dispatch {
            accepted: self.accepted,
            completion: Completion(Box::pin(async move { completion.await.flatten() })),
        }
    }
}

impl<T> std::fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("accepted", &self.accepted)
            .finish_non_exhaustive()
    }
}

pub struct SideChannelDispatcher {
    context: BridgeContext,
}

impl SideChannelDispatcher {
    pub fn new(context: BridgeContext) -> Self {
        Self { context }
    }

    fn controller(&self, handler: &'static str) -> Option<Rc<Controller>> {
        let controller = self.context.controller();
        if controller.is_none() {
            tracing::warn!(handler, "side-channel request with no mounted controller");
        }
        controller
    }

    pub fn open_attachment_picker(&self, kind: AttachmentKind) -> Dispatch<()> {
        const HANDLER: &str = "open_file_picker";
        let Some(controller) = self.controller(HANDLER) else {
            return Dispatch::rejected();
        };
        tracing::debug!(?kind, "open attachment picker");
        settle(HANDLER, controller.host(), controller.open_file_picker(kind))
    }

    pub fn download_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        const HANDLER: &str = "download_attachment";
        let Some(controller) = self.controller(HANDLER) else {
            return Dispatch::rejected();
        };
        tracing::debug!(hash = %attachment.hash, "download attachment");
        settle(
            HANDLER,
            controller.host(),
            controller.download_attachment(attachment),
        )
    }

    pub fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        const HANDLER: &str = "preview_attachment";
        let Some(controller) = self.controller(HANDLER) else {
            return Dispatch::rejected();
        };
        tracing::debug!(hash = %attachment.hash, "preview attachment");
        settle(
            HANDLER,
            controller.host(),
            controller.preview_attachment(attachment),
        )
    }

    pub fn get_attachment_data(&self, attachment: &AttachmentDescriptor) -> Dispatch<AttachmentData> {
        const HANDLER: &str = "get_attachment_data";
        let Some(controller) = self.controller(HANDLER) else {
            return Dispatch::rejected();
        };
        settle(
            HANDLER,
            controller.host(),
            controller.get_attachment_data(attachment),
        )
        .flatten()
    }

    pub fn open_link(&self, url: &str) -> bool {
        const HANDLER: &str = "open_link";
        let Some(controller) = self.controller(HANDLER) else {
            return false;
        };
        match controller.open_link(url) {
            Ok(handled) => handled,
            Err(error) => {
                surface(controller.host(), &error);
                false
            }
        }
    }

    pub fn copy_to_clipboard(&self, text: &str) {
        const HANDLER: &str = "copy_to_clipboard";
        let Some(controller) = self.controller(HANDLER) else {
            return;
        };
        if let Err(error) = controller.copy_to_clipboard(text) {
            surface(controller.host(), &error);
        }
    }
}

fn surface(host: &Rc<dyn Host>, error: &BridgeError) {
    tracing::warn!(error = %error, "side-channel request not accepted");
    host.report_error(error);
}

fn settle<T: 'static>(
    handler: &'static str,
    host: &Rc<dyn Host>,
    result: HostResult<HostReply<T>>,
) -> Dispatch<T> {
    match result {
        Ok(HostReply::Ready(value)) => Dispatch::accepted(Completion::ready(value)),
        Ok(HostReply::Pending(pending)) => {
            let host = Rc::clone(host);
            Dispatch::accepted(Completion(Box::pin(async move {
                match pending.await {
                    Ok(value) => Some(value),
                    Err(error) => {
                        tracing::warn!(handler, error = %error, "host handler failed after accepting");
                        host.report_error(&error);
                        None
                    }
                }
            })))
        }
        Err(error) => {
            surface(host, &error);
            Dispatch::rejected()
        }
    }
}
