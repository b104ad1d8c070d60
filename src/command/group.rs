#![forbid(unsafe_code)]

//! Command groups and the command registry
//!
//! Commands live inside named groups. Group priority orders rendering;
//! command priority orders rendering within a group and, more importantly,
//! execution order during dispatch.

use crate::command::Command;
use std::convert::Infallible;
use std::io;
use std::str::FromStr;
use termcolor::WriteColor;
use tracing::{debug, warn};

/// Order in which a group lists its commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Priority,
    Alpha,
}

impl FromStr for SortBy {
    type Err = Infallible;

    /// `"alpha"` selects tag order; anything else falls back to priority
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "alpha" => SortBy::Alpha,
            _ => SortBy::Priority,
        })
    }
}

/// A named, prioritized list of commands
#[derive(Debug)]
pub struct Group<C> {
    name: String,
    priority: i32,
    sort_by: SortBy,
    commands: Vec<Command<C>>,
}

impl<C> Group<C> {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Group {
            name: name.into(),
            priority,
            sort_by: SortBy::Priority,
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    /// Switches the sort mode and reorders the commands accordingly
    pub fn sort_by(&mut self, sort_by: SortBy) {
        self.sort_by = sort_by;
        match sort_by {
            SortBy::Priority => self.commands.sort_by_key(|cmd| cmd.priority()),
            SortBy::Alpha => self.commands.sort_by(|a, b| a.tag().cmp(b.tag())),
        }
    }

    /// Commands in the group's current sort order, without reordering storage
    pub fn sorted(&self) -> Vec<&Command<C>> {
        let mut commands: Vec<&Command<C>> = self.commands.iter().collect();
        match self.sort_by {
            SortBy::Priority => commands.sort_by_key(|cmd| cmd.priority()),
            SortBy::Alpha => commands.sort_by(|a, b| a.tag().cmp(b.tag())),
        }
        commands
    }

    pub fn write_usage(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        for cmd in self.sorted() {
            cmd.write_usage(out)?;
        }
        Ok(())
    }
}

/// Registry of groups; looks commands up by tag
#[derive(Debug)]
pub struct Commander<C> {
    groups: Vec<Group<C>>,
}

impl<C> Default for Commander<C> {
    fn default() -> Self {
        Commander { groups: Vec::new() }
    }
}

impl<C> Commander<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group<C>] {
        &self.groups
    }

    /// Groups ordered by priority; ties keep registration order
    pub fn sorted_groups(&self) -> Vec<&Group<C>> {
        let mut groups: Vec<&Group<C>> = self.groups.iter().collect();
        groups.sort_by_key(|group| group.priority);
        groups
    }

    pub fn get_group(&self, name: &str) -> Option<&Group<C>> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn get_group_mut(&mut self, name: &str) -> Option<&mut Group<C>> {
        self.groups.iter_mut().find(|group| group.name == name)
    }

    /// Creates the group, or updates the priority of an existing one, and
    /// files `commands` into it
    pub fn set_group(&mut self, name: &str, priority: i32, commands: Vec<Command<C>>) -> &mut Self {
        match self.get_group_mut(name) {
            Some(group) => group.priority = priority,
            None => self.groups.push(Group::new(name, priority)),
        }
        let commands = commands
            .into_iter()
            .map(|mut cmd| {
                cmd.set_group(name);
                cmd
            })
            .collect();
        self.set_command(commands)
    }

    /// Files each command into the group named by its group field
    ///
    /// A group that does not exist yet is created with priority 0.
    pub fn set_command(&mut self, commands: Vec<Command<C>>) -> &mut Self {
        for cmd in commands {
            if self.locate(cmd.tag()).is_some() {
                warn!(tag = cmd.tag(), "command tag already registered; the first one keeps winning");
            }
            let position = match self.groups.iter().position(|group| group.name == cmd.group()) {
                Some(position) => position,
                None => {
                    debug!(group = cmd.group(), "creating group for command");
                    self.groups.push(Group::new(cmd.group(), 0));
                    self.groups.len() - 1
                }
            };
            debug!(tag = cmd.tag(), group = cmd.group(), "command registered");
            self.groups[position].commands.push(cmd);
        }
        self
    }

    /// First command with this tag, scanning groups in registration order
    pub fn get_command(&self, tag: &str) -> Option<&Command<C>> {
        self.locate(tag).map(|location| self.command_at(location))
    }

    pub fn get_command_mut(&mut self, tag: &str) -> Option<&mut Command<C>> {
        self.locate(tag).map(|location| self.command_at_mut(location))
    }

    /// `(group index, command index)` of the first command with this tag
    pub(crate) fn locate(&self, tag: &str) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(g, group)| {
            group
                .commands
                .iter()
                .position(|cmd| cmd.tag() == tag)
                .map(|c| (g, c))
        })
    }

    pub(crate) fn command_at(&self, (group, command): (usize, usize)) -> &Command<C> {
        &self.groups[group].commands[command]
    }

    pub(crate) fn command_at_mut(&mut self, (group, command): (usize, usize)) -> &mut Command<C> {
        &mut self.groups[group].commands[command]
    }

    /// Renders every group in priority order
    pub fn write_usage(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        for group in self.sorted_groups() {
            group.write_usage(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::{ErrorHandling, FlagSet};

    fn create_test_command(tag: &str, priority: i32) -> Command<()> {
        Command::new(tag, FlagSet::new(tag, ErrorHandling::ContinueOnError)).with_priority(priority)
    }

    fn tags(commands: &[&Command<()>]) -> Vec<String> {
        commands.iter().map(|cmd| cmd.tag().to_string()).collect()
    }

    #[test]
    fn test_set_group_assigns_group_names() {
        let mut commander = Commander::new();
        commander.set_group("tools", 5, vec![create_test_command("fmt", 1)]);

        let cmd = commander.get_command("fmt").unwrap();
        assert_eq!(cmd.group(), "tools");
        assert_eq!(commander.get_group("tools").unwrap().priority(), 5);
    }

    #[test]
    fn test_set_group_appends_to_existing_group() {
        let mut commander = Commander::new();
        commander.set_group("tools", 5, vec![create_test_command("fmt", 1)]);
        commander.set_group("tools", 2, vec![create_test_command("lint", 1)]);

        assert_eq!(commander.groups().len(), 1);
        let group = commander.get_group("tools").unwrap();
        assert_eq!(group.priority(), 2);
        assert_eq!(group.commands().len(), 2);
    }

    #[test]
    fn test_set_command_files_by_group_name() {
        let mut commander = Commander::new();
        commander.set_group("", 0, vec![]);
        commander.set_group("extra", 1, vec![]);
        commander.set_command(vec![
            create_test_command("a", 0),
            create_test_command("b", 0).with_group("extra"),
            create_test_command("c", 0).with_group("late"),
        ]);

        assert_eq!(commander.get_group("").unwrap().commands().len(), 1);
        assert_eq!(commander.get_group("extra").unwrap().commands().len(), 1);
        assert_eq!(commander.get_group("late").unwrap().priority(), 0);
    }

    #[test]
    fn test_get_command_first_match_wins() {
        let mut commander = Commander::new();
        commander.set_group("first", 0, vec![create_test_command("dup", 1)]);
        commander.set_group("second", 1, vec![create_test_command("dup", 2)]);

        assert_eq!(commander.get_command("dup").unwrap().priority(), 1);
        assert!(commander.get_command("missing").is_none());
    }

    #[test]
    fn test_group_sorting() {
        let mut group = Group::new("g", 0);
        group.commands.push(create_test_command("zeta", 1));
        group.commands.push(create_test_command("alpha", 3));
        group.commands.push(create_test_command("mid", 2));

        assert_eq!(tags(&group.sorted()), vec!["zeta", "mid", "alpha"]);

        group.sort_by("alpha".parse().unwrap());
        assert_eq!(tags(&group.sorted()), vec!["alpha", "mid", "zeta"]);
        assert_eq!(group.commands()[0].tag(), "alpha");

        group.sort_by("default".parse().unwrap());
        assert_eq!(group.commands()[0].tag(), "zeta");
    }

    #[test]
    fn test_sorted_groups_by_priority() {
        let mut commander: Commander<()> = Commander::new();
        commander.set_group("late", 9, vec![]);
        commander.set_group("early", 1, vec![]);

        let groups = commander.sorted_groups();
        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn test_write_usage_orders_groups_and_commands() {
        let mut commander = Commander::new();
        commander.set_group("late", 9, vec![create_test_command("last", 0)]);
        commander.set_group(
            "early",
            1,
            vec![create_test_command("second", 2), create_test_command("first", 1)],
        );

        let mut buffer = termcolor::Buffer::no_color();
        commander.write_usage(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();

        let first = text.find("first [<flags>]").unwrap();
        let second = text.find("second [<flags>]").unwrap();
        let last = text.find("last [<flags>]").unwrap();
        assert!(first < second && second < last);
    }
}
