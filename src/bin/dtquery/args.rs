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

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use domaintree::name::Name;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Query a domain tree built from a list of names
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up names in the tree
    Lookup(LookupArgs),

    /// Print the structure of the tree
    Dump(DumpArgs),

    /// List the names in the tree in hierarchical order
    List(ListArgs),
}

#[derive(Debug, Parser)]
pub struct LookupArgs {
    /// Set the configuration file listing the names of the tree
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Stop lookups at names marked as zone cuts
    #[clap(long)]
    pub stop_at_cuts: bool,

    /// The names to look up
    #[clap(required = true, value_name = "NAME")]
    pub names: Vec<Name>,
}

#[derive(Debug, Parser)]
pub struct DumpArgs {
    /// Set the configuration file listing the names of the tree
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Remove structural leaf nodes before printing
    #[clap(long)]
    pub compact: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Set the configuration file listing the names of the tree
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,
}
