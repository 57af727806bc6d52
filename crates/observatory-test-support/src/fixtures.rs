//! Small authored graphs for tests.

use observatory_narrative::application::loader::load_from_yaml_str;
use observatory_narrative::domain::graph::NarrativeGraph;

/// A two-node graph: `gate` offers `enter` (to the choiceless `hall`) and
/// `walk-away`, which has no successor and resolves the branch.
pub const THRESHOLD_NARRATIVE: &str = r"
start: gate
nodes:
  - id: gate
    title: The Gate
    prompt: Do you step through?
    description: A quiet gate hums at the edge of the city.
    choices:
      - id: enter
        label: Step through
        summary: Cross the threshold.
        resonance: Light spills across the floor.
        next_id: hall
      - id: walk-away
        label: Walk away
        summary: Leave the gate to its humming.
        resonance: The hinges sigh.
  - id: hall
    title: The Hall
    prompt: The hall is silent.
    description: Nothing further is asked of you here.
    choices: []
";

/// Builds [`THRESHOLD_NARRATIVE`].
///
/// # Panics
///
/// Panics if the fixture document is malformed.
#[must_use]
pub fn threshold_graph() -> NarrativeGraph {
    load_from_yaml_str(THRESHOLD_NARRATIVE).expect("threshold fixture is a valid narrative")
}
