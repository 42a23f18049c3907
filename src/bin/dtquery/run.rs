// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the subcommands.

use std::fmt::Write;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};

use domaintree::name::Name;
use domaintree::tree::{DomainTree, Node, NodeChain, NodeFlags, NodeId, SearchResult};

use crate::args::{Command, DumpArgs, ListArgs, LookupArgs};
use crate::config::{self, Config};

/// The tree type the binary works with.
type Tree = DomainTree<String>;

/// Runs a subcommand, exiting the process on failure.
pub fn run(command: Command) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    let result = match command {
        Command::Lookup(args) => lookup(args),
        Command::Dump(args) => dump(args),
        Command::List(args) => list(args),
    };
    if let Err(e) = result {
        let mut message = String::from("Failed:");
        for (i, cause) in e.chain().enumerate() {
            write!(message, "\n[{}] {}", i + 1, cause).unwrap();
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
}

/// Loads the configuration at `path` and builds a tree from it.
fn load(path: &Path) -> Result<Tree> {
    info!("Loading the configuration from {}.", path.display());
    let config = config::load_from_path(path).context("failed to load the configuration")?;
    build_tree(config)
}

fn build_tree(config: Config) -> Result<Tree> {
    let mut tree = Tree::new(config.return_empty_node);
    for name_config in config.names {
        let name = name_config.name.0;
        let id = match name_config.value {
            Some(value) => tree.insert_data(&name, value),
            None => tree.insert(&name),
        }
        .with_context(|| format!("failed to insert {}", name))?;
        tree[id].set_flag(NodeFlags::CALLBACK, name_config.callback);
    }
    info!("Built a domain tree with {} nodes.", tree.node_count());
    Ok(tree)
}

////////////////////////////////////////////////////////////////////////
// LOOKUP                                                             //
////////////////////////////////////////////////////////////////////////

fn lookup(args: LookupArgs) -> Result<()> {
    let tree = load(&args.config)?;
    for name in &args.names {
        println!("{}", lookup_one(&tree, name, args.stop_at_cuts)?);
    }
    Ok(())
}

/// Looks up `name` in `tree` and describes the result in one line.
fn lookup_one(tree: &Tree, name: &Name, stop_at_cuts: bool) -> Result<String> {
    let mut chain = NodeChain::new();
    let mut cuts = Vec::new();
    let mut callback = |id: NodeId, _: &Node<String>| {
        cuts.push(id);
        stop_at_cuts
    };
    let result = tree
        .search_ext(name, &mut chain, Some(&mut callback))
        .with_context(|| format!("failed to look up {}", name))?;

    let mut line = format!("{}: ", name);
    match result {
        SearchResult::ExactMatch(id) => {
            write!(line, "found {}", describe(tree, &chain, id)?).unwrap();
        }
        SearchResult::PartialMatch(id) => {
            write!(line, "closest enclosing {}", describe(tree, &chain, id)?).unwrap();
        }
        SearchResult::NotFound => line.push_str("not found"),
    }
    for cut in cuts {
        write!(line, "; passed cut {}", matched_name(tree, &chain, cut)?).unwrap();
    }
    Ok(line)
}

fn describe(tree: &Tree, chain: &NodeChain, id: NodeId) -> Result<String> {
    let name = matched_name(tree, chain, id)?;
    Ok(match tree[id].data() {
        Some(value) => format!("{} = {:?}", name, value),
        None => format!("{} (structural)", name),
    })
}

/// Builds the absolute name of `id`, which is either in `chain` or is
/// the node the search stopped at before it was added to `chain`.
fn matched_name(tree: &Tree, chain: &NodeChain, id: NodeId) -> Result<Name> {
    let nodes = chain.nodes();
    let levels = match nodes.iter().position(|&n| n == id) {
        Some(i) => &nodes[..i],
        None => nodes,
    };
    let mut name = tree[id].name().clone();
    for &level in levels.iter().rev() {
        name = name
            .concat(tree[level].name())
            .context("failed to build the name of a node")?;
    }
    Ok(name)
}

////////////////////////////////////////////////////////////////////////
// DUMP AND LIST                                                      //
////////////////////////////////////////////////////////////////////////

fn dump(args: DumpArgs) -> Result<()> {
    let mut tree = load(&args.config)?;
    println!("empty leaf nodes: {}%", tree.empty_leaf_node_ratio());
    if args.compact {
        let mut removed = 0;
        loop {
            let n = tree
                .remove_empty_leaf_node()
                .context("failed to remove empty leaf nodes")?;
            if n == 0 {
                break;
            }
            removed += n;
        }
        println!("removed {} empty leaf node(s)", removed);
    }

    let mut out = String::new();
    tree.dump(&mut out, 0).context("failed to render the tree")?;
    print!("{}", out);
    Ok(())
}

fn list(args: ListArgs) -> Result<()> {
    let tree = load(&args.config)?;
    for (name, node) in &tree {
        match node.data() {
            Some(value) => println!("{} {:?}", name, value),
            None => println!("{}", name),
        }
    }
    Ok(())
}
