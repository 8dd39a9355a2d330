//! The interactive command loop.

use crate::console::{Console, ConsoleError};
use crate::render;
use anyhow::Result;
use chrono::Local;
use lineage_core::config::LineageConfig;
use lineage_core::person::{Gender, PersonId};
use lineage_core::session::Session;
use lineage_core::storage;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Commands understood at the `# ` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    New,
    AddParent,
    AddChild,
    AddSpouse,
    RemovePerson,
    RemoveRelation,
    Save,
    Show,
    ShowAll,
    ShowAllRelations,
    ShortestPath,
    Exit,
    Help,
}

impl Command {
    /// Keyword, command and help text, in help order.
    pub const ALL: [(&'static str, Command, &'static str); 13] = [
        ("new", Command::New, "Add new person"),
        ("addp", Command::AddParent, "Add parent of a person"),
        ("addc", Command::AddChild, "Add child of a person"),
        ("adds", Command::AddSpouse, "Add spouse of a person"),
        ("show", Command::Show, "Find and show matching person"),
        ("showall", Command::ShowAll, "Show all persons in lineage"),
        (
            "showallrel",
            Command::ShowAllRelations,
            "Show all relations in lineage",
        ),
        ("sp", Command::ShortestPath, "Shortest path between two persons"),
        (
            "rmrel",
            Command::RemoveRelation,
            "Remove relation between two persons",
        ),
        ("rmperson", Command::RemovePerson, "Remove person from lineage"),
        ("save", Command::Save, "Save lineage to file"),
        ("exit", Command::Exit, "Exit the lineage prompt"),
        ("help", Command::Help, "Show this help"),
    ];
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|(kw, ..)| *kw == s)
            .map(|(_, cmd, _)| *cmd)
            .ok_or(())
    }
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The command loop over one session.
pub struct Shell<R, W> {
    console: Console<R, W>,
    session: Session,
    config: LineageConfig,
    data_dir: PathBuf,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        console: Console<R, W>,
        session: Session,
        config: LineageConfig,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            console,
            session,
            config,
            data_dir,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Show help, then read and execute commands until exit or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.show_help()?;
        loop {
            let flow = match self.console.non_empty_input("# ") {
                Ok(word) => match word.parse::<Command>() {
                    Ok(cmd) => self.execute(cmd),
                    Err(()) => {
                        self.console.red("Wrong input")?;
                        Ok(Flow::Continue)
                    }
                },
                Err(e) => Err(e.into()),
            };

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if is_closed(&e) => {
                    self.console.red("\nAborted")?;
                    self.autosave();
                    return Ok(());
                }
                Err(e) => {
                    // Domain errors are reported and the loop continues.
                    self.console.red(format!("{e:#}"))?;
                }
            }
            self.console.grey("_".repeat(50))?;
        }
    }

    /// Run a single command.
    pub fn execute(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::New => self.add_new_person()?,
            Command::AddParent => self.add_parent()?,
            Command::AddChild => self.add_child()?,
            Command::AddSpouse => self.add_spouse()?,
            Command::RemovePerson => self.remove_person()?,
            Command::RemoveRelation => self.remove_relation()?,
            Command::Save => self.save()?,
            Command::Show => self.find()?,
            Command::ShowAll => self.all_persons()?,
            Command::ShowAllRelations => self.all_relations()?,
            Command::ShortestPath => self.shortest_path()?,
            Command::Help => self.show_help()?,
            Command::Exit => return self.safe_exit(),
        }
        Ok(Flow::Continue)
    }

    fn add_new_person(&mut self) -> Result<()> {
        self.console.heading("ADD NEW PERSON")?;
        let name = self.console.non_empty_input("Input name: ")?;
        let gender: Gender = self
            .console
            .input_from("Input gender (m/f): ", &["m", "f"])?
            .parse()?;
        let parent1 = self.optional_person("Input ID of parent1 or leave blank: ")?;
        let parent2 = self.optional_person("Input ID of parent2 or leave blank: ")?;

        let id = self
            .session
            .apply(|l| l.add_person(&name, gender).map(|p| p.id()))?;
        let mut all_added = true;
        for parent in [parent1, parent2].into_iter().flatten() {
            if let Err(e) = self.session.apply(|l| l.add_parent(id, parent)) {
                self.console.red(format!("Parent {parent} not added"))?;
                self.console.red(e)?;
                all_added = false;
            }
        }
        if all_added {
            self.console.yellow("Person added successfully")?;
        }
        self.print_person_details(id)
    }

    fn add_parent(&mut self) -> Result<()> {
        self.console.heading("ADD PARENT")?;
        let person = self.person_id("Enter ID of person: ")?;
        let parent = self.person_id("Enter ID of parent: ")?;
        self.session.apply(|l| l.add_parent(person, parent))?;
        self.print_person_details(person)
    }

    fn add_child(&mut self) -> Result<()> {
        self.console.heading("ADD CHILD")?;
        let person = self.person_id("Enter ID of person: ")?;
        let child = self.person_id("Enter ID of child: ")?;
        self.session.apply(|l| l.add_child(person, child))?;
        self.print_person_details(person)
    }

    fn add_spouse(&mut self) -> Result<()> {
        self.console.heading("ADD SPOUSE")?;
        let first = self.person_id("Enter ID I of person: ")?;
        let second = self.person_id("Enter ID II of person: ")?;
        self.session.apply(|l| l.add_spouse(first, second))?;
        self.console.yellow("Added successfully")?;
        self.print_person_details(first)
    }

    fn remove_person(&mut self) -> Result<()> {
        self.console.heading("REMOVE PERSON")?;
        let id = self.person_id("Enter ID of the person: ")?;
        let isolated = self
            .session
            .lineage()
            .find_person_by_id(id)
            .map(|p| p.is_isolated());
        match isolated {
            None => self.console.red("ID not found")?,
            Some(false) => self
                .console
                .red("Relative(s) are present. First remove relations.")?,
            Some(true) => {
                self.session.apply(|l| l.remove_person(id))?;
                self.console.cyan("Person removed")?;
            }
        }
        Ok(())
    }

    fn remove_relation(&mut self) -> Result<()> {
        self.console.heading("REMOVE RELATION")?;
        let person = self.person_id("Enter ID I of person: ")?;
        let relative = self.person_id("Enter ID II of person: ")?;
        let kind = self.session.apply(|l| l.remove_relation(person, relative))?;
        self.console
            .cyan(format!("Relation removed ({relative} was {kind} of {person})"))?;
        self.print_person_details(person)
    }

    fn save(&mut self) -> Result<()> {
        if !self.session.is_modified() {
            self.console.red("No change since last save")?;
            return Ok(());
        }
        let path = storage::snapshot_path(&self.data_dir, Local::now());
        match self.session.save(&path) {
            Ok(()) => {
                info!(path = %path.display(), "snapshot written");
                self.console
                    .green(format!("Saved successfully at {}", path.display()))?;
            }
            Err(e) => {
                self.console.red("Some error occurred while saving file")?;
                self.console.red(e)?;
            }
        }
        Ok(())
    }

    /// Write an autosave snapshot if there are unsaved changes. Failures are only logged.
    fn autosave(&mut self) {
        if !self.session.is_modified() || !self.config.storage.autosave {
            return;
        }
        let path = storage::autosave_path(&self.data_dir, Local::now());
        match self.session.save(&path) {
            Ok(()) => info!(path = %path.display(), "autosaved"),
            Err(e) => warn!(error = %e, "autosave failed"),
        }
    }

    fn find(&mut self) -> Result<()> {
        self.console.heading("FIND PERSON")?;
        let query = self.console.non_empty_input("Enter name or ID to search: ")?;
        if let Some(id) = parse_id_query(&query) {
            if self.session.lineage().find_person_by_id(id).is_some() {
                self.print_person_details(id)?;
            } else {
                self.console.red("ID not found")?;
            }
            return Ok(());
        }

        let ids: Vec<PersonId> = self
            .session
            .lineage()
            .find_person_by_name(&query, self.config.search.case_sensitive)
            .iter()
            .map(|p| p.id())
            .collect();
        if ids.is_empty() {
            self.console.red("No match found")?;
        }
        for id in ids {
            self.console.grey(" - ".repeat(17))?;
            self.print_person_details(id)?;
        }
        Ok(())
    }

    fn all_persons(&mut self) -> Result<()> {
        self.console.heading("ALL PERSONS IN LINEAGE")?;
        let lines: Vec<String> = self
            .session
            .lineage()
            .all_persons()
            .into_iter()
            .map(render::person_summary)
            .collect();
        for line in lines {
            self.console.cyan(line)?;
        }
        Ok(())
    }

    fn all_relations(&mut self) -> Result<()> {
        self.console.heading("ALL RELATIONS IN LINEAGE")?;
        let relations = self.session.lineage().all_relations();
        for relation in relations {
            self.console.cyan(relation)?;
        }
        Ok(())
    }

    fn shortest_path(&mut self) -> Result<()> {
        self.console.heading("SHORTEST PATH")?;
        let from = self.person_id("Enter ID of I person: ")?;
        let to = self.person_id("Enter ID of II person: ")?;
        let lineage = self.session.lineage();
        match lineage.shortest_path(from, to)? {
            Some(path) => {
                let line = render::path_line(lineage, &path);
                let hops = path.len();
                self.console.cyan(line)?;
                self.console.field("Length", hops)?;
            }
            None => self
                .console
                .red(format!("No path found between {from} and {to}"))?,
        }
        Ok(())
    }

    fn safe_exit(&mut self) -> Result<Flow> {
        if !self.session.is_modified() {
            self.console.yellow("Exiting...")?;
            return Ok(Flow::Exit);
        }
        let answer = self.console.input_from(
            "You have unsaved data. Do you really want to exit without saving (y/n): ",
            &["y", "n", "yes", "no"],
        )?;
        if matches!(answer.as_str(), "y" | "yes") {
            self.autosave();
            return Ok(Flow::Exit);
        }
        self.console.red("Exit aborted")?;
        Ok(Flow::Continue)
    }

    fn show_help(&mut self) -> Result<()> {
        self.console
            .yellow("USAGE: Type following commands to do respective action")?;
        for (kw, _, help) in Command::ALL {
            self.console.yellow(format!("    {kw:<12}{help}"))?;
        }
        Ok(())
    }

    fn print_person_details(&mut self, id: PersonId) -> Result<()> {
        let lineage = self.session.lineage();
        let Some(person) = lineage.find_person_by_id(id) else {
            self.console.red("ID not found")?;
            return Ok(());
        };
        for (label, value) in render::person_details(lineage, person) {
            self.console.field(label, value)?;
        }
        Ok(())
    }

    /// Prompt for a required person id.
    fn person_id(&mut self, msg: &str) -> Result<PersonId> {
        let raw = self.console.non_empty_input(msg)?;
        Ok(raw.parse()?)
    }

    /// Prompt for an optional existing person id. Invalid input is reported and skipped.
    fn optional_person(&mut self, msg: &str) -> Result<Option<PersonId>> {
        let raw = self.console.take_input(msg)?;
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<PersonId>() {
            Ok(id) if self.session.lineage().contains(id) => Ok(Some(id)),
            Ok(_) => {
                self.console.red(format!("Error in ID {raw}: ID not found"))?;
                Ok(None)
            }
            Err(e) => {
                self.console.red(format!("Error in ID {raw}: {e}"))?;
                Ok(None)
            }
        }
    }
}

/// Ask whether to load a saved lineage and which one.
///
/// Falls back to a new, empty session when nothing is chosen or loading fails.
pub fn choose_session<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    data_dir: &Path,
) -> Result<Session> {
    let answer = console.input_from(
        "Do you want to load lineage from file (y/n)? ",
        &["y", "n", "yes", "no"],
    )?;
    if matches!(answer.as_str(), "y" | "yes") {
        let files = storage::list_snapshots(data_dir)?;
        let chosen = match files.len() {
            0 => {
                console.red(format!("No saved lineage found in {}", data_dir.display()))?;
                None
            }
            1 => {
                console.yellow(format!("{} found", display_name(&files[0])))?;
                Some(files[0].clone())
            }
            n => {
                for (i, file) in files.iter().enumerate() {
                    console.cyan(format!("{}: {}", i + 1, display_name(file)))?;
                }
                let pick = console.input_in_range("Select the file to load: ", 1, n + 1)?;
                Some(files[pick - 1].clone())
            }
        };
        if let Some(path) = chosen {
            match Session::open(&path) {
                Ok(session) => {
                    console.yellow(format!(
                        "Loaded {} person(s)",
                        session.lineage().len()
                    ))?;
                    return Ok(session);
                }
                Err(e) => console.red(e)?,
            }
        }
    }
    console.yellow("Creating new lineage")?;
    Ok(Session::default())
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    )
}

/// `7` and `P7` are id lookups; anything else is a name search.
pub fn parse_id_query(query: &str) -> Option<PersonId> {
    let query = query.trim();
    let digits = query
        .strip_prefix('P')
        .or_else(|| query.strip_prefix('p'))
        .unwrap_or(query);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn is_closed(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ConsoleError>(), Some(ConsoleError::Closed))
}
