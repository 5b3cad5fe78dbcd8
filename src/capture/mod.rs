//! Boundary to the external matcher and its capture mode.
//!
//! The matcher is a black box that scores a probe against a candidate. In
//! capture mode it also records intermediate results; closing the session
//! yields a [`CaptureArchive`] holding the pairing graph and, when the
//! matcher recorded them, the decoded input templates.
//!
//! Capture sessions are not assumed to be re-entrant. [`capture`] opens one
//! session per call and closes it on every exit path.

use crate::pairing::{dedup_pairs, extract_pairs, MatchedPair, PairingGraph};
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::{MosaicError, Result};

/// Pairing graph key recorded for the best-scoring root.
pub const BEST_PAIRING_KEY: &str = "best-pairing";
/// Pairing graph key recorded for the last evaluated root.
pub const PAIRING_KEY: &str = "pairing";
/// Root pair list key.
pub const ROOTS_KEY: &str = "roots";
/// Probe input template key.
pub const PROBE_TEMPLATE_KEY: &str = "probe-template";
/// Candidate input template key.
pub const CANDIDATE_TEMPLATE_KEY: &str = "candidate-template";

/// Records produced by one capture session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureArchive {
    /// Pairing graph of the best-scoring root.
    pub best_pairing: Option<PairingGraph>,
    /// Pairing graph of the most recently evaluated root.
    pub pairing: Option<PairingGraph>,
    /// Root pairs the matcher considered.
    pub roots: Option<Vec<MatchedPair>>,
    /// Probe template as the matcher decoded it.
    pub probe_template: Option<Template>,
    /// Candidate template as the matcher decoded it.
    pub candidate_template: Option<Template>,
}

impl CaptureArchive {
    /// Lists the keys of the records present in the archive.
    pub fn keys(&self) -> Vec<String> {
        [
            (BEST_PAIRING_KEY, self.best_pairing.is_some()),
            (PAIRING_KEY, self.pairing.is_some()),
            (ROOTS_KEY, self.roots.is_some()),
            (PROBE_TEMPLATE_KEY, self.probe_template.is_some()),
            (CANDIDATE_TEMPLATE_KEY, self.candidate_template.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(key, _)| key.to_string())
        .collect()
    }

    /// Returns the deduplicated matched pairs.
    ///
    /// The best pairing graph is preferred, then the plain pairing graph, then
    /// the root pair list.
    ///
    /// # Errors
    /// Returns [`MosaicError::NoPairingData`] when none of them yields a pair.
    pub fn pairs(&self) -> Result<Vec<MatchedPair>> {
        let pairs = match (&self.best_pairing, &self.pairing, &self.roots) {
            (Some(graph), _, _) | (None, Some(graph), _) => extract_pairs(graph),
            (None, None, Some(roots)) => dedup_pairs(roots.iter().copied()),
            (None, None, None) => Vec::new(),
        };
        if pairs.is_empty() {
            return Err(MosaicError::NoPairingData { keys: self.keys() });
        }
        Ok(pairs)
    }
}

/// An open capture session on a matcher.
pub trait CaptureSession {
    /// Ends the session and returns what it recorded.
    fn close(&mut self) -> Result<CaptureArchive>;
}

/// External fingerprint matcher.
pub trait Matcher {
    /// Session type returned by [`Matcher::open_capture`].
    type Session: CaptureSession;

    /// Scores `candidate` against `probe`.
    fn score(&self, probe: &Template, candidate: &Template) -> Result<f64>;

    /// Starts recording intermediate results of subsequent [`Matcher::score`]
    /// calls.
    fn open_capture(&self) -> Result<Self::Session>;
}

/// Score and archive of a captured match.
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    /// Match score reported by the matcher.
    pub score: f64,
    /// Records captured while scoring.
    pub archive: CaptureArchive,
}

/// Closes the wrapped session when dropped unless it was closed explicitly.
struct SessionGuard<S: CaptureSession> {
    session: Option<S>,
}

impl<S: CaptureSession> SessionGuard<S> {
    fn close(mut self) -> Result<CaptureArchive> {
        match self.session.take() {
            Some(mut session) => session.close(),
            None => Err(MosaicError::Capture {
                reason: "capture session already closed".to_string(),
            }),
        }
    }
}

impl<S: CaptureSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.close();
        }
    }
}

/// Scores `candidate` against `probe` inside a capture session.
///
/// The session is closed whether or not scoring succeeds.
pub fn capture<M: Matcher + ?Sized>(
    matcher: &M,
    probe: &Template,
    candidate: &Template,
) -> Result<Capture> {
    let _span = trace_span!("capture").entered();
    let guard = SessionGuard {
        session: Some(matcher.open_capture()?),
    };
    let score = matcher.score(probe, candidate)?;
    let archive = guard.close()?;
    trace_event!("capture_closed", score = score, records = archive.keys().len());
    Ok(Capture { score, archive })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_prefer_best_pairing() {
        let archive = CaptureArchive {
            best_pairing: Some(PairingGraph::new(MatchedPair::new(1, 1))),
            pairing: Some(PairingGraph::new(MatchedPair::new(2, 2))),
            roots: Some(vec![MatchedPair::new(3, 3)]),
            ..CaptureArchive::default()
        };
        assert_eq!(archive.pairs().unwrap(), vec![MatchedPair::new(1, 1)]);
    }

    #[test]
    fn roots_are_deduplicated() {
        let archive = CaptureArchive {
            roots: Some(vec![
                MatchedPair::new(4, 0),
                MatchedPair::new(5, 0),
                MatchedPair::new(6, 1),
            ]),
            ..CaptureArchive::default()
        };
        assert_eq!(
            archive.pairs().unwrap(),
            vec![MatchedPair::new(4, 0), MatchedPair::new(6, 1)]
        );
    }

    #[test]
    fn empty_archive_reports_keys() {
        let archive = CaptureArchive {
            roots: Some(Vec::new()),
            ..CaptureArchive::default()
        };
        assert_eq!(
            archive.pairs().unwrap_err(),
            MosaicError::NoPairingData {
                keys: vec![ROOTS_KEY.to_string()]
            }
        );
    }
}
