//! Fluent builder for constructing a [`Session`].

use wp_geocode::CancelToken;
use wp_route::RouteTracker;

use crate::{
    AnchorState, HeadingSlot, HeadingSource, NoopObserver, Session, SessionConfig,
    SessionObserver, SessionResult,
};

/// Fluent builder for [`Session<O>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                          |
/// |-----------------------|----------------------------------|
/// | `.observer(o)`        | [`NoopObserver`]                 |
/// | `.heading_source(s)`  | Detached slot (heading `0.0`)    |
///
/// # Example
///
/// ```rust,ignore
/// let mut session = SessionBuilder::new(SessionConfig::default())
///     .heading_source(Box::new(compass))
///     .build()?;
/// session.start(&gps);
/// session.load_destinations(&source, geocoder)?;
/// let selection = session.select_destination(DestinationId(0))?;
/// ```
pub struct SessionBuilder<O: SessionObserver> {
    config:   SessionConfig,
    observer: O,
    heading:  Option<Box<dyn HeadingSource>>,
}

impl SessionBuilder<NoopObserver> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            observer: NoopObserver,
            heading:  None,
        }
    }
}

impl<O: SessionObserver> SessionBuilder<O> {
    /// Replace the observer.
    pub fn observer<O2: SessionObserver>(self, observer: O2) -> SessionBuilder<O2> {
        SessionBuilder {
            config:  self.config,
            observer,
            heading: self.heading,
        }
    }

    /// Attach the compass used for the camera heading.
    pub fn heading_source(mut self, source: Box<dyn HeadingSource>) -> Self {
        self.heading = Some(source);
        self
    }

    /// Validate the config and assemble the session.
    ///
    /// Subscribes to the heading sensor when `config.subscribe_heading` is
    /// set and a source is attached; a sensor failure is logged, not fatal.
    pub fn build(self) -> SessionResult<Session<O>> {
        self.config.validate()?;

        let mut heading = match self.heading {
            Some(source) => HeadingSlot::new(source),
            None => HeadingSlot::detached(),
        };
        if self.config.subscribe_heading {
            heading.subscribe();
        }

        Ok(Session {
            config:       self.config,
            anchor:       AnchorState::Pending,
            destinations: None,
            route:        RouteTracker::new(),
            heading,
            cancel:       CancelToken::new(),
            observer:     self.observer,
        })
    }
}
