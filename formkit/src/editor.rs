//! Designer sessions.
//!
//! A [`Designer`] owns the three values a form design consists of and hands
//! out editors over them. Each editor borrows its store exclusively for as
//! long as it lives and performs its teardown save when dropped, so only
//! one editor per value can be open at a time.

use std::{rc::Rc, time::Duration};

use crate::{
    config::EditorOptions,
    convert::{SchemaConverter, ScopeGuard, TextCodec, scope_options},
    error::{FormError, Result},
    meta,
    model::{DataSchema, Document, EditSchema, FormData, FormSchema, UiSchema},
    state::{BufferedState, Clock, Source, Store, SyncedState, SystemClock},
};

/// Structured data-schema editor: a draft [`EditSchema`] over the stored
/// [`DataSchema`].
pub type SchemaEditor<'a> =
    BufferedState<SyncedState<&'a mut Store<DataSchema>, SchemaConverter>>;

/// Structured layout editor. Layouts whose scopes do not resolve against
/// the data schema are kept as drafts and reported, never stored.
pub type UiSchemaEditor<'a> = BufferedState<SyncedState<&'a mut Store<UiSchema>, ScopeGuard>>;

/// Form data as edited through the rendered form.
pub type FormDataEditor<'a> = BufferedState<&'a mut Store<FormData>>;

type TextChain<'a, D> = BufferedState<SyncedState<BufferedState<&'a mut Store<D>>, TextCodec<D>>>;

/// Raw-JSON editor over a stored document.
///
/// Typing goes into a debounced text draft. When the debounce fires (or on
/// [`save`](Self::save)) the text is parsed into a second draft of the
/// document; that draft reaches the store on `save` or when the editor is
/// dropped.
pub struct JsonEditor<'a, D: Document> {
    chain: TextChain<'a, D>,
}

impl<'a, D: Document> JsonEditor<'a, D> {
    fn new(store: &'a mut Store<D>, options: &EditorOptions, clock: &Rc<dyn Clock>) -> Self {
        let draft = BufferedState::new(store).with_autosave(options.autosave_on_drop);
        let synced = SyncedState::new(String::new(), draft, TextCodec::new());
        let mut chain = BufferedState::new(synced).with_autosave(options.autosave_on_drop);
        if let Some(interval) = options.json_debounce() {
            chain = chain.with_debounce(interval, Rc::clone(clock));
        }
        JsonEditor { chain }
    }

    pub fn text(&self) -> &str {
        self.chain.value()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.chain.set_value(text.into());
    }

    /// The parse error for the last text pushed, if it did not parse.
    pub fn error(&self) -> Option<&FormError> {
        self.chain.source().error()
    }

    /// The parsed document draft.
    pub fn document(&self) -> &D {
        self.chain.source().source().value()
    }

    /// Whether there is unsaved text or an unsaved parsed draft.
    pub fn is_changed(&self) -> bool {
        self.chain.is_changed() || self.chain.source().source().is_changed()
    }

    /// Fire a due debounce. Returns whether text was pushed for parsing.
    pub fn poll(&mut self) -> bool {
        self.chain.poll()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.chain.next_deadline()
    }

    /// Push pending text and store the parsed draft. Returns whether the
    /// store was written.
    pub fn save(&mut self) -> bool {
        self.chain.save();
        self.chain.source_mut().source_mut().save()
    }

    /// Discard both drafts and reload the text from the store.
    pub fn revert(&mut self) {
        self.chain.revert();
        let synced = self.chain.source_mut();
        synced.source_mut().revert();
        synced.reload();
        self.chain.refresh();
    }

    /// Replace the parsed draft with the default document.
    pub fn clear(&mut self) {
        self.chain.save();
        let synced = self.chain.source_mut();
        synced.source_mut().set_value(D::default());
        synced.refresh();
        self.chain.refresh();
    }

    /// Pick up changes made to the store by other editors.
    pub fn refresh(&mut self) {
        self.chain.refresh();
    }
}

/// A form-design session: data schema, layout and sample data.
pub struct Designer {
    schema: Store<DataSchema>,
    uischema: Store<UiSchema>,
    data: Store<FormData>,
    options: EditorOptions,
    clock: Rc<dyn Clock>,
}

impl Default for Designer {
    fn default() -> Self {
        Designer::new(FormSchema::default())
    }
}

impl Designer {
    pub fn new(form: FormSchema) -> Self {
        info!(
            "opening designer with {} scopes",
            scope_options(&form.schema).len()
        );
        Designer {
            schema: Store::new(form.schema),
            uischema: Store::new(form.uischema),
            data: Store::new(FormData::default()),
            options: EditorOptions::default(),
            clock: Rc::new(SystemClock::new()),
        }
    }

    /// Parse a stored bundle, filling missing members with defaults.
    pub fn load(text: &str) -> Result<Self> {
        FormSchema::parse(text).map(Designer::new)
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    /// Time source for debounced editors.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    pub fn with_data(mut self, data: FormData) -> Self {
        self.data = Store::new(data);
        self
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn schema_gui(&mut self) -> SchemaEditor<'_> {
        let synced = SyncedState::new(EditSchema::object(), &mut self.schema, SchemaConverter);
        buffer(synced, &self.options, self.options.gui_debounce(), &self.clock)
    }

    pub fn schema_json(&mut self) -> JsonEditor<'_, DataSchema> {
        JsonEditor::new(&mut self.schema, &self.options, &self.clock)
    }

    pub fn uischema_gui(&mut self) -> UiSchemaEditor<'_> {
        let guard = ScopeGuard::new(self.schema.value().clone());
        let synced = SyncedState::new(UiSchema::default(), &mut self.uischema, guard);
        buffer(synced, &self.options, self.options.gui_debounce(), &self.clock)
    }

    pub fn uischema_json(&mut self) -> JsonEditor<'_, UiSchema> {
        JsonEditor::new(&mut self.uischema, &self.options, &self.clock)
    }

    pub fn form_data(&mut self) -> FormDataEditor<'_> {
        buffer(
            &mut self.data,
            &self.options,
            self.options.gui_debounce(),
            &self.clock,
        )
    }

    /// Clear the stored form data to `{}`.
    pub fn reset(&mut self) {
        debug!("resetting form data");
        self.data.put(FormData::default());
    }

    /// What the form renderer consumes.
    pub fn triple(&self) -> (&DataSchema, &UiSchema, &FormData) {
        (self.schema.value(), self.uischema.value(), self.data.value())
    }

    /// The stored design.
    pub fn bundle(&self) -> FormSchema {
        FormSchema::new(self.schema.value().clone(), self.uischema.value().clone())
    }

    pub fn to_text(&self) -> Result<String> {
        self.bundle().stringify()
    }

    /// Layout scopes that no longer resolve against the data schema.
    pub fn unresolved_scopes(&self) -> Vec<String> {
        self.bundle().unresolved_scopes()
    }

    /// Schema and layout for rendering one record of the schema editor.
    pub fn schema_editor_forms(&self) -> (DataSchema, UiSchema) {
        (meta::editing_schema(), meta::editing_uischema())
    }

    /// Schema and layout for rendering one element of the layout editor,
    /// with scope choices taken from the current data schema.
    pub fn uischema_editor_forms(&self) -> Result<(DataSchema, UiSchema)> {
        let scopes = scope_options(self.schema.value());
        Ok((meta::ui_editing_schema(&scopes)?, meta::ui_editing_uischema()))
    }
}

fn buffer<S: Source>(
    source: S,
    options: &EditorOptions,
    debounce: Option<Duration>,
    clock: &Rc<dyn Clock>,
) -> BufferedState<S> {
    let buffered = BufferedState::new(source).with_autosave(options.autosave_on_drop);
    match debounce {
        Some(interval) => buffered.with_debounce(interval, Rc::clone(clock)),
        None => buffered,
    }
}
