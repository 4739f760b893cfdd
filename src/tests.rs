use super::*;

mod attach_and_initial_state;
mod effects_and_options;

const PET_SURVEY: &str = r#"
    <form id='survey'>
      <div class='sq-form-question' id='q-pet'>
        <input type='radio' name='pet' value='dog' id='pet-dog'>
        <input type='radio' name='pet' value='cat' id='pet-cat'>
        <input type='radio' name='pet' value='fish' id='pet-fish'>
      </div>
      <div class='sq-form-question' id='q-dog'>
        <span data-depends-on='pet=dog'></span>
        <label>Breed</label><input name='breed'>
      </div>
      <div class='sq-form-question' id='q-cat'>
        <span data-depends-on='pet=cat'></span>
        <label>Indoor?</label><input type='checkbox' name='indoor'>
      </div>
      <div class='sq-form-question' id='q-fish'>
        <span data-depends-on='pet=fish'></span>
        <label>Tank size</label><input name='tank'>
      </div>
    </form>
    "#;

fn attached(html: &str) -> Result<Harness> {
    let mut h = Harness::from_html(html)?;
    h.attach("form", Options::default())?;
    Ok(h)
}

fn summary_of(outcome: &AttachOutcome<NodeId>) -> &AttachSummary<NodeId> {
    match outcome {
        AttachOutcome::Attached(summary) => summary,
        AttachOutcome::AlreadyAttached { .. } => panic!("expected a fresh attachment"),
    }
}
