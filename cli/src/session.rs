//! Converter session: runs the converter's effects against a rate engine.

use std::fmt::Write as _;
use std::sync::Arc;

use fxconv_common::{Clock, Currency};
use fxconv_converter::{Action, Converter, Effect};
use fxconv_fx::{FetchCompletion, RateEngine};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Owns a [`Converter`] and executes the fetches it asks for.
///
/// Fetches run as spawned tasks; their completions queue on a channel until
/// the caller applies them, so the converter sees them in arrival order.
pub struct Session {
    converter: Converter,
    engine: RateEngine,
    clock: Arc<dyn Clock>,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    rx: mpsc::UnboundedReceiver<FetchCompletion>,
    in_flight: usize,
}

impl Session {
    /// Create a new session.
    pub fn new(converter: Converter, engine: RateEngine, clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            converter,
            engine,
            clock,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Dispatch an action and start any fetches it requires.
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.converter.dispatch(action, self.clock.now());
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchRates(request) => {
                debug!(base = %request.base, fetch_id = %request.id, "Starting rate fetch");
                self.in_flight += 1;

                let engine = self.engine.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let completion = engine.execute(request).await;
                    if tx.send(completion).is_err() {
                        warn!("Session closed before fetch completed");
                    }
                });
            }
            Effect::FocusAmount => debug!("Focus returned to amount"),
        }
    }

    /// Whether any fetch is still running.
    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Wait for the next fetch to finish. Returns `None` when nothing is in
    /// flight.
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        self.rx.recv().await
    }

    /// Feed a finished fetch back to the converter. Returns the base it was
    /// for.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> Currency {
        self.in_flight = self.in_flight.saturating_sub(1);
        let base = completion.request.base.clone();
        self.dispatch(Action::RatesFetched(completion));
        base
    }

    /// Apply completions until no fetch is in flight.
    pub async fn settle(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.apply_completion(completion);
        }
    }

    /// The converter.
    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Multi-line view of the current state.
    pub fn render(&self) -> String {
        let converter = &self.converter;
        let state = converter.state();
        let mut out = String::new();

        let _ = writeln!(out, "Pair:   {}", state.pair());
        let _ = writeln!(out, "Amount: {}", state.amount_text);
        if let Some(e) = converter.amount_error() {
            let _ = writeln!(out, "        {}", e);
        }
        if converter.is_loading() {
            let _ = writeln!(out, "Loading rates...");
        }
        if let Some(e) = converter.visible_error() {
            let _ = writeln!(out, "Error:  {}", e);
        }
        if let Some(summary) = converter.summary() {
            let _ = writeln!(out, "{}", summary);
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use fxconv_common::{ManualClock, RateEntry, RateTable, Timestamp};
    use fxconv_converter::ConverterConfig;
    use fxconv_fx::MockRateProvider;
    use rust_decimal_macros::dec;

    fn t0() -> Timestamp {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn setup() -> (Arc<MockRateProvider>, Arc<ManualClock>, Session) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_table(
            "GBP",
            vec![
                RateEntry::new("USD", dec!(1.25)),
                RateEntry::new("EUR", dec!(1.15)),
                RateEntry::new("CHF", dec!(1.12)),
            ]
            .into_iter()
            .collect::<RateTable>(),
        );
        provider.set_table(
            "EUR",
            vec![
                RateEntry::new("USD", dec!(1.10)),
                RateEntry::new("GBP", dec!(0.87)),
            ]
            .into_iter()
            .collect::<RateTable>(),
        );
        provider.set_failure("CHF", "HTTP status 503");

        let clock = Arc::new(ManualClock::new(t0()));
        let session = Session::new(
            Converter::new(ConverterConfig::default()),
            RateEngine::new(provider.clone()),
            clock.clone(),
        );
        (provider, clock, session)
    }

    #[tokio::test]
    async fn test_init_and_convert() {
        let (provider, _, mut session) = setup();

        session.dispatch(Action::Init);
        assert!(session.has_pending());
        session.settle().await;
        assert!(!session.has_pending());
        assert!(!session.converter().is_loading());
        assert_eq!(session.converter().currency_codes().len(), 4);

        session.dispatch(Action::SetAmount("100".to_string()));
        session.dispatch(Action::Convert);
        session.settle().await;

        assert_eq!(session.converter().result(), Some(dec!(125)));
        assert_eq!(provider.calls(), 1);
        assert!(session.render().contains("125.00 USD"));
    }

    #[tokio::test]
    async fn test_swap_fetches_new_base() {
        let (provider, clock, mut session) = setup();

        session.dispatch(Action::Init);
        session.settle().await;

        clock.advance(Duration::seconds(5));
        session.dispatch(Action::Swap);
        let base = match session.next_completion().await {
            Some(completion) => session.apply_completion(completion),
            None => panic!("swap should start a fetch"),
        };

        assert_eq!(base, Currency::usd());
        assert_eq!(provider.calls_for(&Currency::usd()), 1);
        assert!(session.next_completion().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_banner() {
        let (_, _, mut session) = setup();

        session.dispatch(Action::Init);
        session.settle().await;
        session.dispatch(Action::SetBase(Currency::new("CHF")));
        session.settle().await;

        assert_eq!(
            session.converter().visible_error().map(ToString::to_string).as_deref(),
            Some("Network error or invalid response")
        );
        assert!(session.render().contains("Error:  Network error or invalid response"));
    }

    #[tokio::test]
    async fn test_cached_base_is_not_refetched() {
        let (provider, clock, mut session) = setup();

        session.dispatch(Action::Init);
        session.settle().await;
        session.dispatch(Action::SetBase(Currency::eur()));
        session.settle().await;

        clock.advance(Duration::seconds(30));
        session.dispatch(Action::SetBase(Currency::gbp()));
        assert!(!session.has_pending());
        assert_eq!(provider.calls_for(&Currency::gbp()), 1);

        clock.advance(Duration::seconds(31));
        session.dispatch(Action::SetBase(Currency::eur()));
        assert!(session.has_pending());
        session.settle().await;
        assert_eq!(provider.calls_for(&Currency::eur()), 2);
    }

    #[tokio::test]
    async fn test_render_shows_amount_error() {
        let (_, _, mut session) = setup();

        session.dispatch(Action::Init);
        session.settle().await;
        session.dispatch(Action::SetAmount("-5".to_string()));

        let view = session.render();
        assert!(view.contains("Amount must be greater than zero"));
        assert!(!view.contains("Error:"));
    }
}
