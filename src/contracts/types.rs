// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::prelude::*;

// ChainVote ABI, restricted to what the client calls and watches
abigen!(
    ChainVote,
    r#"[
        {
            "inputs": [],
            "name": "proposalFee",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "getProposalCount",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "string", "name": "name", "type": "string"},
                {"internalType": "string", "name": "details", "type": "string"},
                {"internalType": "string[]", "name": "choices", "type": "string[]"},
                {"internalType": "uint256", "name": "votingStart", "type": "uint256"},
                {"internalType": "uint256", "name": "votingEnd", "type": "uint256"}
            ],
            "name": "createProposal",
            "outputs": [{"internalType": "uint256", "name": "proposalId", "type": "uint256"}],
            "stateMutability": "payable",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"internalType": "uint256", "name": "choiceId", "type": "uint256"},
                {"internalType": "bytes32", "name": "encryptedVote", "type": "bytes32"},
                {"internalType": "bytes", "name": "proof", "type": "bytes"}
            ],
            "name": "castVote",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "proposalId", "type": "uint256"}],
            "name": "requestResultsDecryption",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "proposalId", "type": "uint256"}],
            "name": "getProposalInfo",
            "outputs": [
                {"internalType": "string", "name": "name", "type": "string"},
                {"internalType": "string", "name": "details", "type": "string"},
                {"internalType": "string[]", "name": "choices", "type": "string[]"},
                {"internalType": "uint256", "name": "votingStart", "type": "uint256"},
                {"internalType": "uint256", "name": "votingEnd", "type": "uint256"},
                {"internalType": "bool", "name": "resultsPublished", "type": "bool"},
                {"internalType": "address", "name": "proposer", "type": "address"},
                {"internalType": "uint256", "name": "voterCount", "type": "uint256"}
            ],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint256", "name": "proposalId", "type": "uint256"}],
            "name": "getProposalResults",
            "outputs": [{"internalType": "uint256[]", "name": "votes", "type": "uint256[]"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"internalType": "address", "name": "voter", "type": "address"}
            ],
            "name": "hasVoted",
            "outputs": [{"internalType": "bool", "name": "", "type": "bool"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"indexed": true, "internalType": "address", "name": "proposer", "type": "address"},
                {"indexed": false, "internalType": "string", "name": "name", "type": "string"},
                {"indexed": false, "internalType": "uint256", "name": "votingStart", "type": "uint256"},
                {"indexed": false, "internalType": "uint256", "name": "votingEnd", "type": "uint256"},
                {"indexed": false, "internalType": "uint256", "name": "choicesCount", "type": "uint256"}
            ],
            "name": "ProposalCreated",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"indexed": true, "internalType": "address", "name": "voter", "type": "address"},
                {"indexed": true, "internalType": "uint256", "name": "choiceId", "type": "uint256"}
            ],
            "name": "VoteCast",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"indexed": true, "internalType": "uint256", "name": "requestId", "type": "uint256"}
            ],
            "name": "ResultsDecryptionRequested",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "proposalId", "type": "uint256"},
                {"indexed": false, "internalType": "uint256[]", "name": "votes", "type": "uint256[]"},
                {"indexed": false, "internalType": "uint256", "name": "totalVoters", "type": "uint256"}
            ],
            "name": "ResultsPublished",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": false, "internalType": "uint256", "name": "oldFee", "type": "uint256"},
                {"indexed": false, "internalType": "uint256", "name": "newFee", "type": "uint256"}
            ],
            "name": "ProposalFeeUpdated",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": false, "internalType": "uint256", "name": "amount", "type": "uint256"},
                {"indexed": true, "internalType": "address", "name": "recipient", "type": "address"}
            ],
            "name": "FundsWithdrawn",
            "type": "event"
        },
        {"inputs": [], "name": "Unauthorized", "type": "error"},
        {"inputs": [], "name": "InsufficientFee", "type": "error"},
        {"inputs": [], "name": "InvalidProposal", "type": "error"},
        {"inputs": [], "name": "InvalidTimeWindow", "type": "error"},
        {"inputs": [], "name": "InvalidChoices", "type": "error"},
        {"inputs": [], "name": "VotingNotStarted", "type": "error"},
        {"inputs": [], "name": "VotingEnded", "type": "error"},
        {"inputs": [], "name": "VotingInProgress", "type": "error"},
        {"inputs": [], "name": "AlreadyVoted", "type": "error"},
        {"inputs": [], "name": "InvalidChoice", "type": "error"},
        {"inputs": [], "name": "ResultsAlreadyPublished", "type": "error"},
        {"inputs": [], "name": "ResultsNotAvailable", "type": "error"},
        {"inputs": [], "name": "DecryptionPending", "type": "error"},
        {"inputs": [], "name": "InvalidCallback", "type": "error"},
        {"inputs": [], "name": "WithdrawFailed", "type": "error"}
    ]"#
);
