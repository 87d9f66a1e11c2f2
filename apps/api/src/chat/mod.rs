// Chat relay: one POST /chat turn runs translate → (match | generate → translate) → respond.
// Stateless across requests; the only shared data is the read-only resume corpus.

pub mod handlers;
pub mod orchestrator;
pub mod replies;

#[cfg(test)]
pub mod fakes;
